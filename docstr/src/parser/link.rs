//! `see` links: copying documented arguments from elsewhere.

use super::fields::Mode;
use super::DocstringParser;
use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::host::Object;
use crate::model::{ArgDoc, ArgMap, Token};
use crate::resolve::Context;
use tracing::debug;

const SELF: &str = "self";

impl<'h> DocstringParser<'h> {
    /// Resolve a single-argument link such as `x : see self`, copying type
    /// and default from the enclosing class attribute. A local description
    /// wins over the linked one.
    pub(super) fn link_one(
        &mut self,
        ctx: Context<'_>,
        name: &str,
        target: &str,
        arg: Option<&str>,
        description: Option<String>,
        parent: Option<&ArgMap>,
    ) -> Result<ArgDoc> {
        let source_name = match (target.strip_prefix(SELF), arg) {
            (Some(""), None) => name,
            (Some(""), Some(arg)) => arg,
            (Some(rest), None) if rest.len() > 1 && rest.starts_with('.') => &rest[1..],
            _ => {
                return Err(Error::UnsupportedLink {
                    object: ctx.object.to_string(),
                    name: name.to_string(),
                    target: match arg {
                        Some(arg) => format!("{target} {arg}"),
                        None => target.to_string(),
                    },
                })
            }
        };
        let parent = parent.ok_or_else(|| Error::NoParent {
            object: ctx.object.to_string(),
        })?;
        let source = parent.get(source_name).ok_or_else(|| Error::MissingParentArg {
            object: ctx.object.to_string(),
            name: source_name.to_string(),
        })?;
        debug!(object = ctx.object, name, source = source_name, "linked argument");

        Ok(ArgDoc::new(name, source.ty.clone())?
            .with_description(description.or_else(|| source.description.clone()))
            .with_default(source.default.clone()))
    }

    /// Resolve a whole-set link such as `see self` or `see other.func`,
    /// returning the arguments to splice in at the marker.
    pub(super) fn link_all(
        &mut self,
        ctx: Context<'_>,
        target: &str,
        mode: Mode,
        parent: Option<&ArgMap>,
        depth: usize,
    ) -> Result<Vec<ArgDoc>> {
        if target == SELF {
            let parent = parent.ok_or_else(|| Error::NoParent {
                object: ctx.object.to_string(),
            })?;
            debug!(object = ctx.object, count = parent.len(), "splicing enclosing attributes");
            return Ok(parent.iter().cloned().collect());
        }

        let object = match self.resolver.resolve(ctx, target)? {
            Entity::Class(class) => Object::Class(class),
            Entity::Function(func) => Object::Function(func),
            _ => {
                return Err(Error::InvalidLinkTarget {
                    object: ctx.object.to_string(),
                    target: target.to_string(),
                })
            }
        };
        let token = self.parse_object(&object, &[], depth + 1)?;
        let args = match (&token, mode) {
            (Token::Function(func), _) => &func.args,
            (Token::Class(class), Mode::Attributes) => &class.attributes,
            (Token::Class(class), Mode::Function) => class.constructor_args(),
        };
        debug!(
            object = ctx.object,
            target = %token.qualified_name(),
            count = args.len(),
            "splicing linked arguments"
        );
        Ok(args.iter().cloned().collect())
    }
}
