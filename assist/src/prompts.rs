//! Prompt text for the assistance flows.

pub(crate) const TITLE_SYSTEM_PROMPT: &str = "You are an expert at generating concise and \
                                              descriptive titles for notes. Generate a title \
                                              that accurately reflects the content of the note. \
                                              The title should be no more than 10 words. Return \
                                              only the title, with no quotes or punctuation \
                                              around it.";

pub(crate) const SUMMARY_SYSTEM_PROMPT: &str = "You summarize notes. Summarize the note content \
                                                the user provides in a concise manner. Return \
                                                only the summary.";
