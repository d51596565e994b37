//! Code rendering: Java source from generation units
//!
//! The module generators produce a language-shaped declaration tree
//! ([`crate::decl`]); this stage lays it out as a `.java` file with genco,
//! adds the provenance header and resolves imports.

mod java;

use crate::config::RenderOptions;
use crate::error::Result;
use crate::generate::GenerationUnit;

/// Where a generated file came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    /// Qualified source type, e.g. `cube.Cube`
    pub source: String,
    /// Descriptor hash, see [`crate::model::Unit::hash`]
    pub hash: String,
}

/// Code renderer
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render a unit to Java source
    pub fn render(&self, unit: &GenerationUnit, provenance: &Provenance) -> Result<String> {
        let source = java::render(unit, provenance, &self.options)?;
        tracing::debug!(
            generated = %unit.type_name.qualified(),
            bytes = source.len(),
            "rendered unit"
        );
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::Build;
    use crate::model::Unit;
    use pretty_assertions::assert_eq;

    fn cube() -> Unit {
        Unit::from_yaml(
            r#"
package: cube
source: Cube
builders: {}
types:
  - name: Cube
    constructors:
      - params: [{ name: width, type: String }, { name: length, type: "List<String>" }]
        goal: {}
"#,
        )
        .unwrap()
    }

    fn render(options: RenderOptions) -> String {
        let unit = Build::default().generate(&cube()).unwrap();
        let provenance = Provenance {
            source: "cube.Cube".into(),
            hash: "sha256:0011223344556677".into(),
        };
        Renderer::new(options).render(&unit, &provenance).unwrap()
    }

    #[test]
    fn test_provenance_header() {
        let java = render(RenderOptions::default());
        let head: Vec<&str> = java.lines().take(4).collect();
        assert_eq!(
            head,
            vec![
                "// GENERATED FROM: cube.Cube",
                "// DESCRIPTOR HASH: sha256:0011223344556677",
                "// DO NOT EDIT - regenerate from the descriptor",
                "package cube;",
            ]
        );
        assert!(!java.contains("// GENERATED:"));
    }

    #[test]
    fn test_without_provenance() {
        let java = render(RenderOptions {
            provenance: false,
            ..Default::default()
        });
        assert!(java.starts_with("package cube;"));
    }

    #[test]
    fn test_timestamp_opt_in() {
        let java = render(RenderOptions {
            timestamp: true,
            ..Default::default()
        });
        assert!(java.lines().any(|l| l.starts_with("// GENERATED: ")));
    }

    #[test]
    fn test_indentation() {
        let java = render(RenderOptions {
            indent: 2,
            ..Default::default()
        });
        assert!(java.lines().any(|l| l == "  private CubeBuilders() {}"), "{}", java);
    }
}
