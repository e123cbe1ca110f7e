//! Per-language "is this entity public" providers.
//!
//! Providers are registered explicitly on a [`VisibilityRegistry`]; the first
//! provider whose [`VisibilityAnalyzer::can_process`] accepts the entity's
//! source path answers. Entities no provider accepts are never public.

use crate::model::{source_path, EntityKind, EntityModel};

/// Decides the visibility of entities for one family of source files.
pub trait VisibilityAnalyzer: Send + Sync {
    /// Whether this provider understands files at `source_path`.
    fn can_process(&self, source_path: &str) -> bool;

    /// Whether the entity `id` is part of the public API.
    fn is_public(&self, model: &dyn EntityModel, id: &str) -> bool;
}

/// Ordered set of visibility providers.
///
/// # Examples
///
/// ```
/// use srb_model::{EntityKind, EntityModel, Project, ProjectEdit, SourceNode, VisibilityRegistry};
///
/// let mut project = Project::empty();
/// let file = SourceNode::new(EntityKind::File, "Main.java").with_child(
///     SourceNode::new(EntityKind::Function, "Main.java:run()").with_modifiers(["public"]),
/// );
/// project.apply(&ProjectEdit::AddNode { node: file }).unwrap();
///
/// let registry = VisibilityRegistry::with_defaults();
/// assert!(registry.is_public(&project, "Main.java:run()"));
/// assert!(!VisibilityRegistry::new().is_public(&project, "Main.java:run()"));
/// ```
#[derive(Default)]
pub struct VisibilityRegistry {
    analyzers: Vec<Box<dyn VisibilityAnalyzer>>,
}

impl VisibilityRegistry {
    /// A registry without providers: nothing is public.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in provider.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(JavaVisibility);
        registry
    }

    /// Append a provider; earlier providers take precedence.
    pub fn register(&mut self, analyzer: impl VisibilityAnalyzer + 'static) {
        self.analyzers.push(Box::new(analyzer));
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    /// Whether no provider is registered.
    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }

    /// Whether `id` is public according to the first matching provider.
    ///
    /// Unknown ids and ids no provider accepts are not public.
    pub fn is_public(&self, model: &dyn EntityModel, id: &str) -> bool {
        if model.entity(id).is_none() {
            return false;
        }
        let path = source_path(id);
        self.analyzers
            .iter()
            .find(|analyzer| analyzer.can_process(path))
            .is_some_and(|analyzer| analyzer.is_public(model, id))
    }
}

impl std::fmt::Debug for VisibilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityRegistry")
            .field("analyzers", &self.analyzers.len())
            .finish()
    }
}

/// Java visibility rules.
///
/// Types and variables are public when declared `public`; functions are public
/// when declared `public` or when they belong to an `interface`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaVisibility;

const PUBLIC: &str = "public";
const INTERFACE: &str = "interface";

impl VisibilityAnalyzer for JavaVisibility {
    fn can_process(&self, source_path: &str) -> bool {
        source_path.ends_with(".java")
    }

    fn is_public(&self, model: &dyn EntityModel, id: &str) -> bool {
        let Some(entity) = model.entity(id) else {
            return false;
        };
        match entity.kind {
            EntityKind::Type | EntityKind::Variable => entity.modifiers.contains(PUBLIC),
            EntityKind::Function => {
                entity.modifiers.contains(PUBLIC)
                    || model.parent(id).is_ok_and(|parent| {
                        parent.kind == EntityKind::Type && parent.modifiers.contains(INTERFACE)
                    })
            }
            EntityKind::File => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::ProjectEdit;
    use crate::model::{Project, SourceNode};

    fn project() -> Project {
        let file = SourceNode::new(EntityKind::File, "Api.java")
            .with_child(
                SourceNode::new(EntityKind::Type, "Api.java:Api")
                    .with_modifiers(["public", "interface"])
                    .with_child(SourceNode::new(EntityKind::Function, "Api.java:Api:call()")),
            )
            .with_child(
                SourceNode::new(EntityKind::Type, "Api.java:Impl")
                    .with_child(
                        SourceNode::new(EntityKind::Function, "Api.java:Impl:call()")
                            .with_modifiers(["public"]),
                    )
                    .with_child(SourceNode::new(EntityKind::Function, "Api.java:Impl:helper()"))
                    .with_child(
                        SourceNode::new(EntityKind::Variable, "Api.java:Impl:count")
                            .with_modifiers(["private"]),
                    ),
            );
        let script = SourceNode::new(EntityKind::File, "tool.py").with_child(
            SourceNode::new(EntityKind::Function, "tool.py:run()").with_modifiers(["public"]),
        );
        let mut project = Project::empty();
        project.apply(&ProjectEdit::AddNode { node: file }).unwrap();
        project.apply(&ProjectEdit::AddNode { node: script }).unwrap();
        project
    }

    #[test]
    fn java_rules() {
        let project = project();
        let java = JavaVisibility;
        assert!(java.is_public(&project, "Api.java:Api"));
        assert!(java.is_public(&project, "Api.java:Api:call()"));
        assert!(java.is_public(&project, "Api.java:Impl:call()"));
        assert!(!java.is_public(&project, "Api.java:Impl"));
        assert!(!java.is_public(&project, "Api.java:Impl:helper()"));
        assert!(!java.is_public(&project, "Api.java:Impl:count"));
        assert!(!java.is_public(&project, "Api.java"));
    }

    #[test]
    fn registry_without_matching_provider_says_private() {
        let project = project();
        let registry = VisibilityRegistry::with_defaults();
        assert!(!registry.is_public(&project, "tool.py:run()"));
        assert!(!registry.is_public(&project, "Api.java:missing()"));
    }

    struct Everything;

    impl VisibilityAnalyzer for Everything {
        fn can_process(&self, _source_path: &str) -> bool {
            true
        }

        fn is_public(&self, _model: &dyn EntityModel, _id: &str) -> bool {
            true
        }
    }

    #[test]
    fn first_matching_provider_wins() {
        let project = project();
        let mut registry = VisibilityRegistry::with_defaults();
        registry.register(Everything);
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_public(&project, "Api.java:Impl:helper()"));
        assert!(registry.is_public(&project, "tool.py:run()"));
    }
}
