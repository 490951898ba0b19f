use autofix_extract::ErrorRecord;

use crate::FileType;

/// Prompt templates for fix requests
pub struct FixPrompts;

impl FixPrompts {
    /// Build the single-file repair prompt.
    ///
    /// The output is a pure function of its inputs so that identical
    /// attempts send identical requests.
    pub fn build_fix_prompt(
        file_path: &str,
        file_type: FileType,
        attempt: u32,
        errors: &[ErrorRecord],
        content: &str,
    ) -> String {
        let error_text = errors
            .iter()
            .map(ErrorRecord::describe)
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"You are an expert {file_type} developer. I need your help fixing errors in a file.

File Path: {path}
File Type: {file_type}
Attempt: {attempt}

The file has the following errors:
{errors}

Here is the current content of the file:
```
{content}
```

Please provide ONLY the fixed version of the file with no explanation. Your response should be the complete file content that resolves the errors."#,
            file_type = file_type.label(),
            path = file_path,
            attempt = attempt,
            errors = error_text,
            content = content,
        )
    }
}
