//! Command registry and path resolution
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Store declarative command trees and resolve nested subcommand paths
//! - 1.0.0: Initial implementation for handler dispatch

use std::collections::HashMap;

use super::tree::{CommandNode, SlashCommand};
use crate::core::RegistrationError;
use crate::interaction::event::RawOption;
use crate::wire::ApplicationCommand;

/// A leaf located by walking an invocation's option nesting
#[derive(Debug)]
pub struct ResolvedCommand<'a> {
    pub leaf: &'a SlashCommand,
    /// The option list that belongs to the leaf, after unwrapping groups
    pub options: &'a [RawOption],
    /// Space-separated path, e.g. `test subtest subsubtest`
    pub path: String,
}

/// Registry mapping top-level command names to their trees
///
/// Registering a name twice replaces the earlier tree.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    roots: HashMap<String, CommandNode>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a top-level command
    pub fn register(&mut self, node: impl Into<CommandNode>) -> Result<(), RegistrationError> {
        let node = node.into();
        node.validate()?;
        self.roots.insert(node.name().to_string(), node);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CommandNode> {
        self.roots.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.roots.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    /// Walk groups by the first nested option's name until a leaf is reached
    pub fn resolve<'a>(
        &'a self,
        name: &str,
        options: &'a [RawOption],
    ) -> Option<ResolvedCommand<'a>> {
        let mut node = self.roots.get(name)?;
        let mut options = options;
        let mut path = node.name().to_string();
        loop {
            match node {
                CommandNode::Leaf(leaf) => {
                    return Some(ResolvedCommand {
                        leaf,
                        options,
                        path,
                    })
                }
                CommandNode::Group(group) => {
                    let selected = options.first()?;
                    node = group.children.iter().find(|c| c.name() == selected.name)?;
                    options = &selected.options;
                    path.push(' ');
                    path.push_str(node.name());
                }
            }
        }
    }

    /// Payload for the bulk overwrite, sorted by name for a stable order
    pub fn payloads(&self) -> Vec<ApplicationCommand> {
        let mut payloads: Vec<ApplicationCommand> =
            self.roots.values().map(CommandNode::to_wire).collect();
        payloads.sort_by(|a, b| a.name.cmp(&b.name));
        payloads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::decode::{decode_arguments, ArgValue};
    use crate::commands::options::{CommandOption, OptionKind, SUBCOMMAND, SUBCOMMAND_GROUP};
    use crate::commands::tree::CommandGroup;
    use crate::wire::CommandOptionPayload;
    use serde_json::json;

    fn leaf(name: &str) -> SlashCommand {
        SlashCommand::new(name, "leaf", |_ctx, _args| async { Ok(()) })
    }

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry
            .register(
                CommandGroup::new("test", "testing").child(
                    CommandGroup::new("subtest", "nested").child(leaf("subsubtest").option(
                        CommandOption::new("val", "value", OptionKind::String, true),
                    )),
                ),
            )
            .unwrap();
        registry
            .register(leaf("ping").option(CommandOption::new(
                "text",
                "echo",
                OptionKind::String,
                false,
            )))
            .unwrap();
        registry
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_registry_rejects_invalid_tree() {
        let mut registry = CommandRegistry::new();
        let err = registry.register(CommandGroup::new("empty", "nothing"));
        assert_eq!(err, Err(RegistrationError::EmptyGroup("empty".into())));
        assert!(!registry.contains("empty"));
    }

    #[test]
    fn test_registry_duplicate_name_replaces() {
        let mut registry = registry();
        registry.register(leaf("ping")).unwrap();
        assert_eq!(registry.len(), 2);
        match registry.get("ping") {
            Some(CommandNode::Leaf(l)) => assert!(l.options.is_empty()),
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_nested_path_and_decode() {
        let registry = registry();
        let raw = vec![RawOption::nested(
            "subtest",
            SUBCOMMAND_GROUP,
            vec![RawOption::nested(
                "subsubtest",
                SUBCOMMAND,
                vec![RawOption::value("val", 3, json!("hi"))],
            )],
        )];

        let resolved = registry.resolve("test", &raw).expect("leaf");
        assert_eq!(resolved.leaf.name, "subsubtest");
        assert_eq!(resolved.path, "test subtest subsubtest");

        let args = decode_arguments(
            &resolved.leaf.options,
            resolved.options,
            &Default::default(),
        );
        assert_eq!(args, vec![ArgValue::String("hi".into())]);
    }

    #[test]
    fn test_resolve_misses() {
        let registry = registry();
        assert!(registry.resolve("missing", &[]).is_none());
        assert!(registry.resolve("test", &[]).is_none());
        let wrong = vec![RawOption::nested("other", SUBCOMMAND_GROUP, Vec::new())];
        assert!(registry.resolve("test", &wrong).is_none());
    }

    /// Every leaf reachable in a payload: `(name, kind)` per level and the leaf's option names
    fn leaf_paths(
        prefix: &[(String, u8)],
        options: &[CommandOptionPayload],
        out: &mut Vec<(Vec<(String, u8)>, Vec<String>)>,
    ) {
        let nested: Vec<_> = options.iter().filter(|o| o.kind <= SUBCOMMAND_GROUP).collect();
        if nested.is_empty() {
            out.push((
                prefix.to_vec(),
                options.iter().map(|o| o.name.clone()).collect(),
            ));
            return;
        }
        for option in nested {
            let mut path = prefix.to_vec();
            path.push((option.name.clone(), option.kind));
            leaf_paths(&path, &option.options, out);
        }
    }

    #[test]
    fn test_payloads_resolve_back_to_every_leaf() {
        let mut registry = registry();
        registry
            .register(
                CommandGroup::new("test", "testing")
                    .child(
                        CommandGroup::new("subtest", "nested").child(
                            leaf("subsubtest")
                                .option(CommandOption::new("val", "value", OptionKind::String, true))
                                .option(CommandOption::new(
                                    "count",
                                    "times",
                                    OptionKind::Integer,
                                    false,
                                )),
                        ),
                    )
                    .child(
                        leaf("flat")
                            .option(CommandOption::new("b", "second", OptionKind::Boolean, true))
                            .option(CommandOption::new("a", "first", OptionKind::String, false)),
                    ),
            )
            .unwrap();

        let mut seen = Vec::new();
        for payload in registry.payloads() {
            let mut leaves = Vec::new();
            leaf_paths(&[], &payload.options, &mut leaves);
            for (levels, option_names) in leaves {
                let raw = levels.iter().rev().fold(Vec::new(), |inner, (name, kind)| {
                    vec![RawOption::nested(name.clone(), *kind, inner)]
                });
                let resolved = registry.resolve(&payload.name, &raw).expect("resolvable");
                let expected = std::iter::once(payload.name.clone())
                    .chain(levels.iter().map(|(name, _)| name.clone()))
                    .collect::<Vec<_>>()
                    .join(" ");
                assert_eq!(resolved.path, expected);
                assert_eq!(
                    resolved
                        .leaf
                        .options
                        .iter()
                        .map(|o| o.name.clone())
                        .collect::<Vec<_>>(),
                    option_names
                );
                seen.push((resolved.path, option_names));
            }
        }

        fn names(list: &[&str]) -> Vec<String> {
            list.iter().map(|n| n.to_string()).collect()
        }
        assert_eq!(
            seen,
            vec![
                ("ping".to_string(), names(&["text"])),
                ("test subtest subsubtest".to_string(), names(&["val", "count"])),
                ("test flat".to_string(), names(&["b", "a"])),
            ]
        );
    }
}
