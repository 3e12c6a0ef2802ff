pub mod json_validation;
pub mod pom_validation;
pub mod property_file;
pub mod token_search;
pub mod utils;
pub mod xml_validation;

#[cfg(test)]
mod tests;

/// Verdict and message produced by one matcher run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub passed: bool,
    pub message: String,
}

impl Outcome {
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Pass when `problems` is empty, otherwise fail with a bulleted list.
    pub fn from_problems(heading: &str, problems: &[String], ok: impl Into<String>) -> Self {
        if problems.is_empty() {
            Self::pass(ok)
        } else {
            Self::fail(utils::bullets(heading, problems))
        }
    }
}
