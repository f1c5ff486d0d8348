//! XML configuration handed to the solver.
//!
//! The solver reads a parameter list naming its input and output files, the
//! level of fill and the block size. Only three tokens in the document are
//! substituted: `{{LEVEL}}`, `{{BLOCK_SIZE}}` and `{{ROOT}}`; the rest of the
//! document is passed through untouched.

use crate::error::{Result, expect};
use std::fs;
use std::path::Path;

pub const LEVEL_TOKEN: &str = "{{LEVEL}}";
pub const BLOCK_SIZE_TOKEN: &str = "{{BLOCK_SIZE}}";
pub const ROOT_TOKEN: &str = "{{ROOT}}";

const DEFAULT_TEMPLATE: &str = r#"<ParameterList name="spiluk">
  <Parameter name="matrix file" type="string" value="{{ROOT}}.mtx"/>
  <Parameter name="rhs file" type="string" value="{{ROOT}}_rhs.mtx"/>
  <Parameter name="fact: iluk level-of-fill" type="int" value="{{LEVEL}}"/>
  <Parameter name="block size" type="int" value="{{BLOCK_SIZE}}"/>
  <Parameter name="L output file" type="string" value="{{ROOT}}_L.mtx"/>
  <Parameter name="U output file" type="string" value="{{ROOT}}_U.mtx"/>
</ParameterList>
"#;

#[derive(Debug, Clone)]
pub struct ConfigTemplate {
    text: String,
}

impl Default for ConfigTemplate {
    fn default() -> Self {
        Self { text: DEFAULT_TEMPLATE.to_string() }
    }
}

impl ConfigTemplate {
    /// Use `text` as the template. All three tokens must appear in it.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        for token in [LEVEL_TOKEN, BLOCK_SIZE_TOKEN, ROOT_TOKEN] {
            expect(text.contains(token), || format!("config template lacks the {} token", token))?;
        }
        Ok(Self { text })
    }

    /// Load a template from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::new(fs::read_to_string(path)?)
    }

    /// Substitute the three tokens.
    pub fn render(&self, level: usize, block_size: usize, root: &str) -> String {
        self.text
            .replace(LEVEL_TOKEN, &level.to_string())
            .replace(BLOCK_SIZE_TOKEN, &block_size.to_string())
            .replace(ROOT_TOKEN, root)
    }

    /// Render into `path`.
    pub fn write(&self, path: &Path, level: usize, block_size: usize, root: &str) -> Result<()> {
        fs::write(path, self.render(level, block_size, root))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;

    #[test]
    fn default_template_substitutes_every_token() {
        let xml = ConfigTemplate::default().render(2, 3, "case7");
        assert!(xml.contains(r#"value="case7.mtx""#));
        assert!(xml.contains(r#"value="case7_U.mtx""#));
        assert!(xml.contains(r#"level-of-fill" type="int" value="2""#));
        assert!(xml.contains(r#"block size" type="int" value="3""#));
        assert!(!xml.contains("{{"));
    }

    #[test]
    fn custom_template_must_have_all_tokens() {
        let err = ConfigTemplate::new("<a level=\"{{LEVEL}}\" root=\"{{ROOT}}\"/>").unwrap_err();
        assert!(matches!(err, HarnessError::PreconditionViolation(ref m) if m.contains("BLOCK_SIZE")));
        let ok = ConfigTemplate::new("{{LEVEL}}/{{BLOCK_SIZE}}/{{ROOT}}").unwrap();
        assert_eq!(ok.render(1, 4, "r"), "1/4/r");
    }
}
