//! Assembly: merge every goal's modules into one generated type
//!
//! [`generate`] turns an [`Analysis`] into a [`GenerationUnit`]. A [`Build`]
//! runs the whole pipeline for several units and remembers which types it
//! already generated, so two sources claiming the same generated name are
//! rejected instead of overwriting each other.

use crate::analyse::{analyse, Analysis};
use crate::code;
use crate::config::GeneratorConfig;
use crate::decl::{FieldSpec, MethodSpec, TypeSpec};
use crate::error::{invalid, ErrorKind, Result};
use crate::goal::{BuildersContext, GoalContext};
use crate::introspect::TypeModel;
use crate::model::{Modifier, Unit};
use crate::modules::{recycles, Module, INSTANCE};
use crate::render::{Provenance, Renderer};
use crate::types::{ClassName, TypeName};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Everything generated for one source type
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationUnit {
    /// The generated type, e.g. `cube.CubeBuilders`
    pub type_name: ClassName,
    /// Entry points with the goal each belongs to
    pub methods: Vec<(String, MethodSpec)>,
    /// Contracts and implementations of all goals
    pub types: Vec<TypeSpec>,
    /// Cache fields of recycling goals
    pub fields: Vec<FieldSpec>,
    /// Whether the per-thread container is needed
    pub thread_local: bool,
}

impl GenerationUnit {
    /// The assembled top-level declaration: container field, cache fields,
    /// private constructor, entry points, nested types
    pub fn type_spec(&self) -> TypeSpec {
        let name = self.type_name.simple_name();
        let generated = TypeName::class(self.type_name.clone());
        let mut spec = TypeSpec::class(name, &[Modifier::Public, Modifier::Final]);

        if self.thread_local {
            let thread_local = ClassName::new("java.lang", ["ThreadLocal"]);
            spec.fields.push(
                FieldSpec::new(
                    INSTANCE,
                    TypeName::parameterized(thread_local.clone(), vec![generated.clone()]),
                    &[Modifier::Private, Modifier::Static, Modifier::Final],
                )
                .with_init(code![
                    TypeName::class(thread_local),
                    ".withInitial(",
                    &generated,
                    "::new)"
                ]),
            );
        }
        spec.fields.extend(self.fields.iter().cloned());
        spec.methods
            .push(MethodSpec::constructor(name).modifiers(&[Modifier::Private]));
        spec.methods
            .extend(self.methods.iter().map(|(_, m)| m.clone()));
        spec.types = self.types.clone();
        spec
    }

    /// Entry points of one goal
    pub fn goal_methods<'a>(&'a self, goal: &'a str) -> impl Iterator<Item = &'a MethodSpec> + 'a {
        self.methods
            .iter()
            .filter(move |(g, _)| g == goal)
            .map(|(_, m)| m)
    }

    /// Source file path relative to the output root, e.g. `cube/CubeBuilders.java`
    pub fn path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in self.type_name.package.split('.').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.push(format!("{}.java", self.type_name.top_level()));
        path
    }
}

/// Run every module of every goal and merge the results
pub fn generate(analysis: &Analysis) -> GenerationUnit {
    let builders = BuildersContext {
        generated: analysis.generated.clone(),
        recycle: analysis.goals.iter().any(recycles),
    };
    let mut unit = GenerationUnit {
        type_name: analysis.generated.clone(),
        methods: Vec::new(),
        types: Vec::new(),
        fields: Vec::new(),
        thread_local: builders.recycle,
    };

    for goal in &analysis.goals {
        let ctx = GoalContext::new(goal, &builders);
        for module in Module::for_goal(goal) {
            let output = module.generate(&ctx);
            let name = &goal.details().name;
            unit.methods
                .extend(output.methods.into_iter().map(|m| (name.clone(), m)));
            unit.types.extend(output.types);
            unit.fields.extend(output.fields);
        }
    }

    tracing::info!(
        generated = %unit.type_name.qualified(),
        goals = analysis.goals.len(),
        types = unit.types.len(),
        "assembled unit"
    );
    unit
}

/// A rendered source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output root
    pub path: PathBuf,
    pub contents: String,
}

/// One build invocation over any number of units
#[derive(Debug, Default)]
pub struct Build {
    config: GeneratorConfig,
    /// Generated type to the source that claimed it
    generated: BTreeMap<ClassName, ClassName>,
}

impl Build {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            generated: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Analyse a unit without generating anything
    pub fn check(&self, unit: &Unit) -> Result<Analysis> {
        let model = TypeModel::new(unit)?;
        analyse(unit, &model, &self.config.defaults)
    }

    /// Analyse and generate one unit
    pub fn generate(&mut self, unit: &Unit) -> Result<GenerationUnit> {
        let analysis = self.check(unit)?;
        if let Some(previous) = self.generated.get(&analysis.generated) {
            tracing::debug!(
                generated = %analysis.generated.qualified(),
                claimed_by = %previous.qualified(),
                "generated type already claimed"
            );
            return invalid(ErrorKind::DuplicateGeneratedType, analysis.source.qualified());
        }
        self.generated
            .insert(analysis.generated.clone(), analysis.source.clone());
        Ok(generate(&analysis))
    }

    /// Analyse, generate and render one unit to Java source
    pub fn render(&mut self, unit: &Unit) -> Result<GeneratedFile> {
        let hash = unit.hash()?;
        let generated = self.generate(unit)?;
        let provenance = Provenance {
            source: format!("{}.{}", unit.package, unit.source)
                .trim_start_matches('.')
                .to_string(),
            hash,
        };
        let contents = Renderer::new(self.config.render.clone()).render(&generated, &provenance)?;
        Ok(GeneratedFile {
            path: generated.path(),
            contents,
        })
    }
}
