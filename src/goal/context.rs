use super::{BeanParameter, EmptyOption, GoalDescription, GoalDetails, RegularParameter};
use crate::types::{ClassName, TypeName};
use crate::util::upcase;

/// The generated top-level type shared by all goals of one source class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildersContext {
    /// e.g. `cube.CubeBuilders`
    pub generated: ClassName,
    /// Whether any goal recycles; adds the thread-local container
    pub recycle: bool,
}

impl BuildersContext {
    pub fn generated_type(&self) -> TypeName {
        TypeName::class(self.generated.clone())
    }
}

/// The parameter a step accepts
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterRef<'a> {
    Regular(&'a RegularParameter),
    Bean(&'a BeanParameter),
}

impl ParameterRef<'_> {
    pub fn name(&self) -> &str {
        match self {
            ParameterRef::Regular(p) => &p.name,
            ParameterRef::Bean(p) => p.name(),
        }
    }

    /// Type of the step method's argument
    pub fn step_type(&self) -> TypeName {
        match self {
            ParameterRef::Regular(p) => p.ty.clone(),
            ParameterRef::Bean(p) => p.step_type(),
        }
    }

    pub fn rejects_null(&self) -> bool {
        match self {
            ParameterRef::Regular(p) => p.rejects_null(),
            ParameterRef::Bean(p) => p.rejects_null(),
        }
    }
}

/// One position in the fluent chain
#[derive(Debug, Clone, PartialEq)]
pub struct Step<'a> {
    pub position: usize,
    /// Contract interface, e.g. `Width`
    pub interface: String,
    /// Step method, e.g. `width`
    pub method: String,
    pub parameter: ParameterRef<'a>,
    /// Successor interface; `None` on the last step
    pub next: Option<String>,
    /// Only the last step declares the goal's exceptions
    pub throws: Vec<TypeName>,
    pub empty: Option<EmptyOption>,
}

impl Step<'_> {
    pub fn is_first(&self) -> bool {
        self.position == 0
    }

    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

/// A goal bound to its step chain
#[derive(Debug, Clone, PartialEq)]
pub struct GoalContext<'a> {
    pub goal: &'a GoalDescription,
    pub builders: &'a BuildersContext,
    pub steps: Vec<Step<'a>>,
}

impl<'a> GoalContext<'a> {
    /// Build the step chain.
    ///
    /// Parameters are visited last to first so every step can name its
    /// already built successor; the list is then flipped to step order.
    pub fn new(goal: &'a GoalDescription, builders: &'a BuildersContext) -> Self {
        let (parameters, throws): (Vec<ParameterRef<'a>>, Vec<TypeName>) = match goal {
            GoalDescription::Regular(g) => (
                g.parameters.iter().map(ParameterRef::Regular).collect(),
                g.throws.clone(),
            ),
            GoalDescription::Bean(g) => (
                g.parameters.iter().map(ParameterRef::Bean).collect(),
                Vec::new(),
            ),
        };

        let mut taken = vec![
            goal.details().contract_name(),
            builders.generated.top_level().to_string(),
        ];
        if let GoalDescription::Regular(g) = goal {
            taken.extend(
                g.type_params
                    .iter()
                    .chain(&g.instance_type_params)
                    .map(|v| v.name.clone()),
            );
        }

        let mut steps: Vec<Step<'a>> = Vec::with_capacity(parameters.len());
        let mut next: Option<String> = None;
        for (position, parameter) in parameters.into_iter().enumerate().rev() {
            let interface = interface_name(parameter.name(), &taken);
            let throws = if next.is_none() {
                throws.clone()
            } else {
                Vec::new()
            };
            steps.push(Step {
                position,
                interface: interface.clone(),
                method: parameter.name().to_string(),
                empty: empty_option(&parameter),
                parameter,
                next: next.replace(interface),
                throws,
            });
        }
        steps.reverse();

        tracing::debug!(
            goal = %goal.details().name,
            steps = steps.len(),
            "built goal context"
        );
        Self {
            goal,
            builders,
            steps,
        }
    }

    pub fn details(&self) -> &'a GoalDetails {
        self.goal.details()
    }

    /// Contract class, e.g. `CubeBuilders.CubeBuilder`
    pub fn contract(&self) -> ClassName {
        self.builders
            .generated
            .nested(&self.details().contract_name())
    }

    /// A step interface type, e.g. `CubeBuilders.CubeBuilder.Width`
    pub fn step_type(&self, interface: &str) -> TypeName {
        TypeName::class(self.contract().nested(interface))
    }

    /// What a step method returns: the successor interface or the goal type
    pub fn next_type(&self, step: &Step<'_>) -> TypeName {
        match &step.next {
            Some(next) => self.step_type(next),
            None => self.details().goal_type.clone(),
        }
    }

    /// Type returned by the builder entry point
    pub fn first_step_type(&self) -> TypeName {
        match self.steps.first() {
            Some(step) => self.step_type(&step.interface),
            None => self.details().goal_type.clone(),
        }
    }

    /// Builder implementation class, e.g. `CubeBuilders.CubeBuilderImpl`
    pub fn impl_type(&self) -> TypeName {
        TypeName::class(self.builders.generated.nested(&self.details().impl_name()))
    }

    /// Updater class, e.g. `CubeBuilders.CubeUpdater`
    pub fn updater_type(&self) -> TypeName {
        TypeName::class(
            self.builders
                .generated
                .nested(&self.details().updater_name()),
        )
    }
}

/// Step interface for a parameter. Names of enclosing classes and goal
/// type variables get a `Step` suffix.
fn interface_name(parameter: &str, taken: &[String]) -> String {
    let name = upcase(parameter);
    if taken.contains(&name) {
        format!("{}Step", name)
    } else {
        name
    }
}

fn empty_option(parameter: &ParameterRef<'_>) -> Option<EmptyOption> {
    match parameter {
        ParameterRef::Regular(_) => None,
        ParameterRef::Bean(BeanParameter::AccessorPair(p)) => EmptyOption::for_type(&p.ty, &p.name),
        ParameterRef::Bean(BeanParameter::LoneGetter(p)) => Some(EmptyOption::clearing(&p.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::{Lifecycle, Projection, RegularGoal, RegularKind};
    use crate::model::{Access, NullPolicy};

    fn goal(names: &[&str]) -> GoalDescription {
        let cube = TypeName::class(ClassName::new("cube", ["Cube"]));
        GoalDescription::Regular(RegularGoal {
            details: GoalDetails {
                name: "cube".into(),
                goal_type: cube.clone(),
                builder: Some(Access::Public),
                updater: None,
                lifecycle: Lifecycle::NewInstance,
                element: "Cube#<init>".into(),
            },
            kind: RegularKind::Constructor,
            owner: cube,
            method: String::new(),
            type_params: vec![],
            instance_type_params: vec![],
            parameters: names
                .iter()
                .map(|n| RegularParameter {
                    name: n.to_string(),
                    ty: TypeName::java_lang("String"),
                    null_policy: NullPolicy::Allow,
                    projection: Projection::None,
                })
                .collect(),
            declaration_order: names.iter().map(|n| n.to_string()).collect(),
            throws: vec![TypeName::class(ClassName::new("java.io", ["IOException"]))],
        })
    }

    fn builders() -> BuildersContext {
        BuildersContext {
            generated: ClassName::new("cube", ["CubeBuilders"]),
            recycle: false,
        }
    }

    #[test]
    fn test_steps_link_forward() {
        let goal = goal(&["width", "length", "height"]);
        let builders = builders();
        let ctx = GoalContext::new(&goal, &builders);
        let interfaces: Vec<&str> = ctx.steps.iter().map(|s| s.interface.as_str()).collect();
        assert_eq!(interfaces, vec!["Width", "Length", "Height"]);
        assert_eq!(ctx.steps[0].next.as_deref(), Some("Length"));
        assert_eq!(ctx.steps[1].next.as_deref(), Some("Height"));
        assert!(ctx.steps[2].is_last());
        assert!(ctx.steps[0].is_first());
        assert_eq!(
            ctx.next_type(&ctx.steps[0]).to_string(),
            "CubeBuilders.CubeBuilder.Length"
        );
        assert_eq!(ctx.next_type(&ctx.steps[2]).to_string(), "Cube");
    }

    #[test]
    fn test_throws_only_on_last_step() {
        let goal = goal(&["a", "b"]);
        let builders = builders();
        let ctx = GoalContext::new(&goal, &builders);
        assert!(ctx.steps[0].throws.is_empty());
        assert_eq!(ctx.steps[1].throws.len(), 1);
    }

    #[test]
    fn test_interfaces_never_reuse_enclosing_names() {
        let goal = goal(&["cubeBuilder", "cubeBuilders", "width"]);
        let builders = builders();
        let ctx = GoalContext::new(&goal, &builders);
        let interfaces: Vec<&str> = ctx.steps.iter().map(|s| s.interface.as_str()).collect();
        assert_eq!(interfaces, vec!["CubeBuilderStep", "CubeBuildersStep", "Width"]);
        assert_eq!(ctx.steps[0].method, "cubeBuilder");
        assert_eq!(ctx.steps[0].next.as_deref(), Some("CubeBuildersStep"));
    }

    #[test]
    fn test_single_step() {
        let goal = goal(&["only"]);
        let builders = builders();
        let ctx = GoalContext::new(&goal, &builders);
        assert_eq!(ctx.steps.len(), 1);
        assert!(ctx.steps[0].is_first() && ctx.steps[0].is_last());
        assert_eq!(ctx.first_step_type().to_string(), "CubeBuilders.CubeBuilder.Only");
    }
}
