//! Supported languages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

const PYTHON_TEMPLATE: &str = "print(input())";

const JAVASCRIPT_TEMPLATE: &str = "const readline = require('readline');
const rl = readline.createInterface({
  input: process.stdin,
  output: process.stdout
});
rl.question('Enter something: ', answer => {
  console.log(answer);
  rl.close();
});";

/// A language the execution backend can run.
///
/// New languages are added here together with their template and
/// input-call token in [`crate::detect`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    JavaScript,
}

impl Language {
    /// Every supported language, in picker order.
    pub const ALL: [Language; 2] = [Language::Python, Language::JavaScript];

    /// Wire identifier sent to the execution backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Python => "Python",
            Self::JavaScript => "JavaScript",
        }
    }

    /// Starting code for a fresh session in this language.
    pub fn template(&self) -> &'static str {
        match self {
            Self::Python => PYTHON_TEMPLATE,
            Self::JavaScript => JAVASCRIPT_TEMPLATE,
        }
    }

    /// File extension used when exporting code.
    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Python => "py",
            Self::JavaScript => "js",
        }
    }

    /// Guess the language from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.file_extension().eq_ignore_ascii_case(ext))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.as_str() == s)
            .ok_or_else(|| Error::UnsupportedLanguage(s.to_string()))
    }
}
