mod client;
mod file_type;
mod prompts;
mod response;

pub use client::{
    ChatCompletionsClient, CompletionSettings, FixError, FixRequest, FixRequester, DEFAULT_MODEL,
    OPENAI_CHAT_URL,
};
pub use file_type::FileType;
pub use prompts::FixPrompts;
pub use response::extract_file_content;
