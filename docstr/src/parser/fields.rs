//! Field matching: a two-phase builder over one docstring's blocks.
//!
//! Phase one walks the blocks and fills partial records keyed by name,
//! resolving types as they appear. Phase two checks that names and types
//! pair up, then materializes the arguments in document order, splicing
//! linked argument sets where their markers were.

use super::DocstringParser;
use crate::entity::{Entity, MultiType};
use crate::error::{Error, Result};
use crate::host::Object;
use crate::model::{ArgDoc, ArgMap, BaseDoc, DefaultValue, OtherSection};
use crate::resolve::Context;
use docstr_syntax::{classify, tokenize_type, Block, Document, FieldKind, TypeBody, TypeToken};
use std::collections::HashMap;
use tracing::debug;

/// What the docstring documents: function arguments or class attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Function,
    Attributes,
}

pub(crate) struct Collected {
    pub args: ArgMap,
    pub returns: Option<BaseDoc>,
    pub other_sections: Vec<OtherSection>,
}

enum Typed {
    Resolved { ty: Entity, default: DefaultValue },
    /// `see <target> [<arg>]`
    Link { target: String, arg: Option<String> },
}

#[derive(Default)]
struct Partial {
    param_seen: bool,
    description: Option<String>,
    typed: Option<Typed>,
}

enum Slot {
    Arg(String),
    /// A `see` marker splicing a whole argument set.
    LinkAll(String),
}

#[derive(Default)]
struct Fields {
    order: Vec<Slot>,
    partials: HashMap<String, Partial>,
    returns: Option<BaseDoc>,
    returns_seen: bool,
    rtype_seen: bool,
    other_sections: Vec<OtherSection>,
}

impl Fields {
    fn entry(&mut self, name: &str) -> &mut Partial {
        if !self.partials.contains_key(name) {
            self.order.push(Slot::Arg(name.to_string()));
        }
        self.partials.entry(name.to_string()).or_default()
    }

    fn param(&mut self, ctx: Context<'_>, name: &str, body: &str) -> Result<()> {
        let partial = self.entry(name);
        if partial.param_seen {
            return Err(Error::DuplicateParam {
                object: ctx.object.to_string(),
                name: name.to_string(),
            });
        }
        partial.param_seen = true;
        partial.description = non_empty(body);
        Ok(())
    }

    fn set_type(&mut self, ctx: Context<'_>, name: &str, typed: Typed) -> Result<()> {
        let partial = self.entry(name);
        if partial.typed.is_some() {
            return Err(Error::DuplicateType {
                object: ctx.object.to_string(),
                name: name.to_string(),
            });
        }
        partial.typed = Some(typed);
        Ok(())
    }

    /// Names whose param and type fields do not pair up, in order. A link
    /// stands in for both.
    fn unmatched(&self) -> Vec<String> {
        self.order
            .iter()
            .filter_map(|slot| match slot {
                Slot::Arg(name) => Some(name),
                Slot::LinkAll(_) => None,
            })
            .filter(|name| {
                let partial = &self.partials[name.as_str()];
                match partial.typed {
                    None => true,
                    Some(Typed::Resolved { .. }) => !partial.param_seen,
                    Some(Typed::Link { .. }) => false,
                }
            })
            .cloned()
            .collect()
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn duplicate_field(ctx: Context<'_>, field: &str) -> Error {
    Error::DuplicateField {
        object: ctx.object.to_string(),
        field: field.to_string(),
    }
}

impl<'h> DocstringParser<'h> {
    pub(crate) fn collect(
        &mut self,
        doc: &Document,
        ctx: Context<'_>,
        mode: Mode,
        parent: Option<&ArgMap>,
        depth: usize,
    ) -> Result<Collected> {
        let mut fields = Fields::default();

        for block in &doc.blocks {
            match block {
                Block::Paragraph(_) => {}
                Block::Field { name, body } => match classify(name)? {
                    FieldKind::Param(name) => fields.param(ctx, &name, body)?,
                    FieldKind::LinkAll(target) => fields.order.push(Slot::LinkAll(target)),
                    FieldKind::Type(name) => {
                        let typed = self.typed(ctx, body, depth)?;
                        fields.set_type(ctx, &name, typed)?;
                    }
                    FieldKind::Returns => {
                        if fields.returns_seen {
                            return Err(duplicate_field(ctx, "returns"));
                        }
                        fields.returns_seen = true;
                        let returns = fields.returns.get_or_insert_with(BaseDoc::default);
                        returns.name = Some("returns".to_string());
                        returns.description = non_empty(body);
                    }
                    FieldKind::RType => {
                        if fields.rtype_seen {
                            return Err(duplicate_field(ctx, "rtype"));
                        }
                        fields.rtype_seen = true;
                        let ty = match tokenize_type(body)? {
                            TypeBody::Alternatives(alts) => self.alternatives(ctx, &alts, depth)?,
                            TypeBody::Link(words) => {
                                return Err(Error::MalformedLink {
                                    object: ctx.object.to_string(),
                                    text: words.join(" "),
                                })
                            }
                        };
                        fields.returns.get_or_insert_with(BaseDoc::default).ty = Some(ty);
                    }
                    FieldKind::Other(name) => fields.other_sections.push(OtherSection {
                        name,
                        body: body.clone(),
                    }),
                },
                Block::Attribute {
                    name,
                    type_body,
                    body,
                } => {
                    fields.param(ctx, name, body)?;
                    let typed = self.typed(ctx, type_body, depth)?;
                    fields.set_type(ctx, name, typed)?;
                }
                Block::SeeAttribute { target } => match target.as_slice() {
                    [target] => fields.order.push(Slot::LinkAll(target.clone())),
                    _ => {
                        return Err(Error::MalformedLink {
                            object: ctx.object.to_string(),
                            text: target.join(" "),
                        })
                    }
                },
                Block::Section {
                    directive,
                    title,
                    body,
                } => fields.other_sections.push(OtherSection {
                    name: if title.is_empty() {
                        directive.clone()
                    } else {
                        title.clone()
                    },
                    body: body.clone(),
                }),
            }
        }

        let unmatched = fields.unmatched();
        if !unmatched.is_empty() {
            return Err(Error::Unmatched {
                object: ctx.object.to_string(),
                names: unmatched,
            });
        }

        let Fields {
            order,
            mut partials,
            returns,
            other_sections,
            ..
        } = fields;

        let mut args = ArgMap::new();
        for slot in order {
            let spliced = match slot {
                Slot::Arg(name) => {
                    let Some(partial) = partials.remove(&name) else {
                        continue;
                    };
                    let arg = match partial.typed {
                        Some(Typed::Resolved { ty, default }) => ArgDoc::new(&name, ty)?
                            .with_description(partial.description)
                            .with_default(default),
                        Some(Typed::Link { target, arg }) => self.link_one(
                            ctx,
                            &name,
                            &target,
                            arg.as_deref(),
                            partial.description,
                            parent,
                        )?,
                        None => continue,
                    };
                    vec![arg]
                }
                Slot::LinkAll(target) => self.link_all(ctx, &target, mode, parent, depth)?,
            };
            for arg in spliced {
                args.insert(arg).map_err(|arg| Error::DuplicateViaLink {
                    object: ctx.object.to_string(),
                    name: arg.name,
                })?;
            }
        }

        Ok(Collected {
            args,
            returns: match mode {
                Mode::Function => returns,
                Mode::Attributes => None,
            },
            other_sections,
        })
    }

    /// Resolve a type field body.
    fn typed(&mut self, ctx: Context<'_>, body: &str, depth: usize) -> Result<Typed> {
        match tokenize_type(body)? {
            TypeBody::Link(words) => match words.as_slice() {
                [target] => Ok(Typed::Link {
                    target: target.clone(),
                    arg: None,
                }),
                [target, arg] => Ok(Typed::Link {
                    target: target.clone(),
                    arg: Some(arg.clone()),
                }),
                _ => Err(Error::MalformedLink {
                    object: ctx.object.to_string(),
                    text: words.join(" "),
                }),
            },
            TypeBody::Alternatives(alts) => {
                let default = match alts.last().and_then(|t| t.default.as_deref()) {
                    Some(token) => DefaultValue::Given(self.resolver.resolve(ctx, token)?),
                    None => DefaultValue::Required,
                };
                let ty = self.alternatives(ctx, &alts, depth)?;
                Ok(Typed::Resolved { ty, default })
            }
        }
    }

    /// Resolve `a | b | c` into one entity, a multi-type when more than one
    /// distinct member remains.
    fn alternatives(&mut self, ctx: Context<'_>, alts: &[TypeToken], depth: usize) -> Result<Entity> {
        let mut members = Vec::with_capacity(alts.len());
        for alt in alts {
            let entity = self.resolver.resolve(ctx, &alt.ty)?;
            members.push(self.expand(entity, depth)?);
        }
        let multi = MultiType::new(members);
        if multi.len() == 1 {
            if let Some(single) = multi.members().first() {
                return Ok(single.clone());
            }
        }
        Ok(Entity::Multi(multi))
    }

    /// Parse a whitelisted class or function type into its own token.
    fn expand(&mut self, entity: Entity, depth: usize) -> Result<Entity> {
        let object = match &entity {
            Entity::Class(class) if self.is_whitelisted(&class.full_name()) => {
                Object::Class(class.clone())
            }
            Entity::Function(func) if self.is_whitelisted(&func.full_name()) => {
                Object::Function(func.clone())
            }
            _ => return Ok(entity),
        };
        debug!(token = %entity, "expanding whitelisted type");
        let token = self.parse_object(&object, &[], depth + 1)?;
        Ok(Entity::Parsed(Box::new(token)))
    }
}
