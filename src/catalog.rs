//! The ADM catalog: a read-only index of loaded ADMs used to resolve
//! symbolic/numeric namespace and object names to each other and to look
//! up parameter signatures. Name/ordinal tables are built once and queried
//! by either key, keyed on ADM namespace and object enumerator.

use std::collections::HashMap;

use crate::error::{AceError, Position, Result};
use crate::registry::ObjectType;
use crate::value::Value;

/// The declared parameter/result shape of one ADM object, used to validate
/// `ObjRef` arity during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub object_type: ObjectType,
    pub param_names: Vec<String>,
}

impl Signature {
    pub fn arity(&self) -> usize {
        self.param_names.len()
    }
}

/// One object entry inside an ADM: its numeric enumerator, name, type, and
/// signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDescriptor {
    pub enumerator: u64,
    pub name: String,
    pub object_type: ObjectType,
    pub signature: Signature,
}

/// An object table: all objects of every type declared by one ADM,
/// keyed both by name and by (object_type, enumerator).
#[derive(Debug, Clone, Default)]
pub struct ObjectTable {
    by_name: HashMap<String, ObjectDescriptor>,
    by_code: HashMap<(ObjectType, u64), String>,
}

impl ObjectTable {
    pub fn insert(&mut self, desc: ObjectDescriptor) {
        self.by_code.insert((desc.object_type, desc.enumerator), desc.name.clone());
        self.by_name.insert(desc.name.clone(), desc);
    }

    pub fn by_name(&self, name: &str) -> Option<&ObjectDescriptor> {
        self.by_name.get(name)
    }

    pub fn by_code(&self, object_type: ObjectType, enumerator: u64) -> Option<&ObjectDescriptor> {
        let name = self.by_code.get(&(object_type, enumerator))?;
        self.by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// One loaded Application Data Model: a namespace symbol, its numeric
/// enumerator, and the objects it declares.
#[derive(Debug, Clone)]
pub struct Adm {
    pub namespace: String,
    pub enumerator: u64,
    pub objects: ObjectTable,
}

impl Adm {
    pub fn new(namespace: impl Into<String>, enumerator: u64) -> Self {
        Self { namespace: namespace.into(), enumerator, objects: ObjectTable::default() }
    }

    pub fn define(
        &mut self,
        enumerator: u64,
        name: impl Into<String>,
        object_type: ObjectType,
        param_names: Vec<String>,
    ) {
        let name = name.into();
        self.objects.insert(ObjectDescriptor {
            enumerator,
            name: name.clone(),
            object_type,
            signature: Signature { object_type, param_names },
        });
    }
}

/// The set of ADMs known to a `Transcoder` invocation. Namespaces are
/// resolved by symbol or by enumerator; callers build one `Catalog` and
/// share it (by reference) across many transcodes. A `Catalog` is immutable
/// once queried: `add_adm` is the only mutator and is never called
/// concurrently with resolution in this crate's intended use.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    by_symbol: HashMap<String, usize>,
    by_enum: HashMap<u64, usize>,
    adms: Vec<Adm>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a namespace. Rejects if its moniker or enumerator collides
    /// with one already in the catalog, so `by_symbol`/`by_enum` never
    /// point away from a live `adms` entry.
    pub fn add_adm(&mut self, adm: Adm) -> Result<()> {
        if self.by_symbol.contains_key(&adm.namespace) {
            return Err(AceError::resolution(
                Position::at_offset(0),
                format!("namespace moniker '{}' is already installed", adm.namespace),
            ));
        }
        if self.by_enum.contains_key(&adm.enumerator) {
            return Err(AceError::resolution(
                Position::at_offset(0),
                format!("namespace enumerator {} is already installed", adm.enumerator),
            ));
        }
        let idx = self.adms.len();
        self.by_symbol.insert(adm.namespace.clone(), idx);
        self.by_enum.insert(adm.enumerator, idx);
        self.adms.push(adm);
        Ok(())
    }

    pub fn resolve_namespace_symbol(&self, symbol: &str) -> Option<&Adm> {
        self.by_symbol.get(symbol).map(|&i| &self.adms[i])
    }

    pub fn resolve_namespace_enum(&self, enumerator: u64) -> Option<&Adm> {
        self.by_enum.get(&enumerator).map(|&i| &self.adms[i])
    }

    /// Resolve an object by namespace symbol and object name, at a
    /// reporting [`Position`] for error attribution.
    pub fn resolve_object(
        &self,
        namespace: &str,
        object_type: ObjectType,
        name: &str,
        pos: Position,
    ) -> Result<(&Adm, &ObjectDescriptor)> {
        let adm = self.resolve_namespace_symbol(namespace).ok_or_else(|| {
            AceError::resolution(pos, format!("unknown namespace '{namespace}'"))
        })?;
        let desc = adm.objects.by_name(name).ok_or_else(|| {
            AceError::resolution(pos, format!("unknown object '{namespace}/{name}'"))
        })?;
        if desc.object_type != object_type {
            return Err(AceError::resolution(
                pos,
                format!(
                    "'{namespace}/{name}' is declared as {:?}, not {:?}",
                    desc.object_type, object_type
                ),
            ));
        }
        Ok((adm, desc))
    }

    /// Resolve an object by namespace and object enumerators.
    pub fn resolve_object_by_enum(
        &self,
        namespace_enum: u64,
        object_type: ObjectType,
        object_enum: u64,
        pos: Position,
    ) -> Result<(&Adm, &ObjectDescriptor)> {
        let adm = self.resolve_namespace_enum(namespace_enum).ok_or_else(|| {
            AceError::resolution(pos, format!("unknown namespace enumerator {namespace_enum}"))
        })?;
        let desc = adm.objects.by_code(object_type, object_enum).ok_or_else(|| {
            AceError::resolution(
                pos,
                format!("unknown object enumerator {object_enum} in namespace '{}'", adm.namespace),
            )
        })?;
        Ok((adm, desc))
    }

    /// Look up the signature of an already-resolved object reference,
    /// validating parameter arity against it.
    pub fn check_arity(&self, sig: &Signature, params: &[Value], pos: Position) -> Result<()> {
        if params.len() != sig.arity() {
            return Err(AceError::signature(
                pos,
                format!("expected {} parameter(s), found {}", sig.arity(), params.len()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> Catalog {
        let mut adm = Adm::new("example", 42);
        adm.define(1, "num_tx", ObjectType::Edd, vec![]);
        adm.define(2, "reset", ObjectType::Ctrl, vec!["iface".into()]);
        let mut cat = Catalog::new();
        cat.add_adm(adm).unwrap();
        cat
    }

    #[test]
    fn resolves_by_symbol_and_name() {
        let cat = sample_catalog();
        let pos = Position::at_offset(0);
        let (adm, desc) = cat.resolve_object("example", ObjectType::Edd, "num_tx", pos).unwrap();
        assert_eq!(adm.enumerator, 42);
        assert_eq!(desc.enumerator, 1);
    }

    #[test]
    fn resolves_by_enumerators() {
        let cat = sample_catalog();
        let pos = Position::at_offset(0);
        let (adm, desc) = cat.resolve_object_by_enum(42, ObjectType::Ctrl, 2, pos).unwrap();
        assert_eq!(adm.namespace, "example");
        assert_eq!(desc.name, "reset");
    }

    #[test]
    fn rejects_colliding_namespace_moniker() {
        let mut cat = sample_catalog();
        assert!(cat.add_adm(Adm::new("example", 99)).is_err());
    }

    #[test]
    fn rejects_colliding_namespace_enumerator() {
        let mut cat = sample_catalog();
        assert!(cat.add_adm(Adm::new("other", 42)).is_err());
    }

    #[test]
    fn rejects_wrong_object_type() {
        let cat = sample_catalog();
        let pos = Position::at_offset(0);
        assert!(cat.resolve_object("example", ObjectType::Ctrl, "num_tx", pos).is_err());
    }

    #[test]
    fn rejects_unknown_namespace() {
        let cat = sample_catalog();
        let pos = Position::at_offset(0);
        assert!(cat.resolve_object("nope", ObjectType::Edd, "num_tx", pos).is_err());
    }

    #[test]
    fn checks_arity() {
        let cat = sample_catalog();
        let pos = Position::at_offset(0);
        let (_, desc) = cat.resolve_object("example", ObjectType::Ctrl, "reset", pos).unwrap();
        assert!(cat.check_arity(&desc.signature, &[Value::Int(1)], pos).is_ok());
        assert!(cat.check_arity(&desc.signature, &[], pos).is_err());
    }
}
