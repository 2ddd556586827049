use std::fmt;

use fnv::FnvHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::ty::Ty;

pub const ANY: &str = "Any";
pub const ERROR: &str = "<ERROR>";
pub const NUMBER: &str = "Number";
pub const STRING: &str = "String";
pub const BOOL: &str = "Bool";

/// Handle to a concrete type stored in a [`TypeRegistry`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    pub description: String,
    pub parent: Option<TypeId>,
    pub members: Vec<String>,
    pub convertible_to: Vec<TypeId>,
}

impl TypeDef {
    pub fn ty(&self) -> Ty {
        Ty::Const(self.name.clone())
    }

    pub fn has_member(&self, member: &str) -> bool {
        self.members.iter().any(|m| m == member)
    }
}

/// All concrete types known to a compilation.
///
/// Types live in an arena and refer to each other by [`TypeId`]. Name lookups
/// go through an index that keeps the first type registered under a name;
/// later registrations with the same name are still enumerated by
/// [`TypeRegistry::with_name`].
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    defs: Vec<TypeDef>,
    names: FnvHashMap<String, TypeId>,
}

impl TypeRegistry {
    pub fn new() -> TypeRegistry {
        TypeRegistry::default()
    }

    /// A registry holding `Any`, the error sentinel, `Number`, `String` and `Bool`
    pub fn with_builtins() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        let any = registry.register(ANY, None);
        registry.describe(any, "Any type.");
        let error = registry.register(ERROR, None);
        registry.describe(error, "(type error)");
        registry.register(NUMBER, Some(any));
        registry.register(STRING, Some(any));
        registry.register(BOOL, Some(any));
        registry
    }

    pub fn register<S: Into<String>>(&mut self, name: S, parent: Option<TypeId>) -> TypeId {
        let name = name.into();
        let id = TypeId(self.defs.len() as u32);
        log::trace!(
            "[registry] {} {} (parent = {:?})",
            id,
            name,
            parent.map(|p| self.name_of(p))
        );
        self.names.entry(name.clone()).or_insert(id);
        self.defs.push(TypeDef {
            description: name.clone(),
            name,
            parent,
            members: vec![],
            convertible_to: vec![],
        });
        id
    }

    /// Registers an enum under the root type with one member per case
    pub fn register_enum<S, I>(&mut self, name: S, cases: I) -> TypeId
    where
        S: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let parent = self.lookup(ANY);
        let id = self.register(name, parent);
        for case in cases {
            self.add_member(id, case);
        }
        id
    }

    pub fn set_parent(&mut self, id: TypeId, parent: Option<TypeId>) {
        self.defs[id.index()].parent = parent;
    }

    pub fn describe<S: Into<String>>(&mut self, id: TypeId, description: S) {
        self.defs[id.index()].description = description.into();
    }

    pub fn add_member<S: Into<String>>(&mut self, id: TypeId, member: S) {
        let member = member.into();
        let def = &mut self.defs[id.index()];
        if !def.has_member(&member) {
            def.members.push(member);
        }
    }

    /// Declares that values of `from` may be used where `to` is expected
    pub fn add_convertible(&mut self, from: TypeId, to: TypeId) {
        let def = &mut self.defs[from.index()];
        if !def.convertible_to.contains(&to) {
            def.convertible_to.push(to);
        }
    }

    pub fn get(&self, id: TypeId) -> &TypeDef {
        &self.defs[id.index()]
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    pub fn name_of(&self, id: TypeId) -> &str {
        &self.get(id).name
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeDef)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(i, def)| (TypeId(i as u32), def))
    }

    /// Number of ancestors between `id` and the root of its hierarchy
    pub fn depth(&self, id: TypeId) -> usize {
        self.ancestors(id).count()
    }

    pub fn ancestors(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        // bounded so that a parent loop cannot spin forever
        std::iter::successors(self.get(id).parent, move |p| self.get(*p).parent)
            .take(self.defs.len())
    }

    pub fn is_ancestor(&self, ancestor: TypeId, of: TypeId) -> bool {
        self.ancestors(of).any(|p| self.same(p, ancestor))
    }

    /// Explicit conversion edge, subtype of `to`, or the same type
    pub fn is_convertible(&self, from: TypeId, to: TypeId) -> bool {
        self.same(from, to)
            || self
                .get(from)
                .convertible_to
                .iter()
                .any(|c| self.same(*c, to))
            || self.is_ancestor(to, from)
    }

    /// Convertibility between two concrete terms, by name. Unknown names are
    /// only convertible to themselves.
    pub fn is_convertible_named(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        match (self.lookup(from), self.lookup(to)) {
            (Some(f), Some(t)) => self.is_convertible(f, t),
            _ => false,
        }
    }

    /// Types that `from` converts to, most specific first
    pub fn convertible_from(&self, from: TypeId) -> Vec<TypeId> {
        self.by_depth(|id| self.is_convertible(from, id))
    }

    /// Types that convert to `to`, most specific first
    pub fn convertible_to(&self, to: TypeId) -> Vec<TypeId> {
        self.by_depth(|id| self.is_convertible(id, to))
    }

    pub fn with_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = TypeId> + 'a {
        self.iter()
            .filter(move |(_, def)| def.name == name)
            .map(|(id, _)| id)
    }

    pub fn with_member<'a>(&'a self, member: &'a str) -> impl Iterator<Item = TypeId> + 'a {
        self.iter()
            .filter(move |(_, def)| def.has_member(member))
            .map(|(id, _)| id)
    }

    fn by_depth<F>(&self, pred: F) -> Vec<TypeId>
    where
        F: Fn(TypeId) -> bool,
    {
        self.iter()
            .map(|(id, _)| id)
            .filter(|id| pred(*id))
            .sorted_by_key(|id| std::cmp::Reverse(self.depth(*id)))
            .collect()
    }

    fn same(&self, a: TypeId, b: TypeId) -> bool {
        a == b || self.name_of(a) == self.name_of(b)
    }
}
