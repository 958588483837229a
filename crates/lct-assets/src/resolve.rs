//! Recursive reference resolution.
//!
//! References found anywhere inside an asset's attributes (nested objects
//! and arrays included) are replaced by the referenced asset, itself fully
//! resolved. The keys on the current resolution path are tracked to detect
//! cycles; completed resolutions are kept in an arena indexed by key, so an
//! asset referenced from several places is fetched and resolved once.

use std::collections::HashMap;

use lct_ledger::LedgerStub;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::asset::Asset;
use crate::error::{AssetError, AssetResult};
use crate::identity::Identity;
use crate::key::{is_reference_object, Key};
use crate::schema::Schema;

/// Resolver limits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOptions {
    /// Deepest reference level to follow. The root is level 0. `None` means
    /// no limit beyond cycle detection.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl ResolveOptions {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }
}

/// Fetch the asset named by `key` and resolve every reference it contains.
///
/// A missing root fails with [`AssetError::NotFound`]; a missing referenced
/// asset fails with [`AssetError::Reference`] wrapping the not-found error.
pub fn resolve_recursive(
    port: &dyn LedgerStub,
    schema: &Schema,
    key: &Key,
    options: &ResolveOptions,
) -> AssetResult<Asset> {
    let root = key.get(port, schema)?;
    let mut resolver = Resolver {
        port,
        schema,
        max_depth: options.max_depth,
        path: Vec::new(),
        arena: HashMap::new(),
    };
    let (resolved, height) = resolver.resolve_asset(root, 0)?;
    debug!(
        key = %key,
        fetched = resolver.arena.len(),
        height,
        "resolved asset"
    );
    Ok(resolved)
}

/// A completed resolution. `height` is the deepest reference level below
/// the asset, relative to it.
struct Resolved {
    value: Value,
    height: usize,
}

struct Resolver<'a> {
    port: &'a dyn LedgerStub,
    schema: &'a Schema,
    max_depth: Option<usize>,
    path: Vec<String>,
    arena: HashMap<String, Resolved>,
}

impl Resolver<'_> {
    fn check_depth(&self, depth: usize) -> AssetResult<()> {
        match self.max_depth {
            Some(max) if depth > max => Err(AssetError::DepthExceeded { max }),
            _ => Ok(()),
        }
    }

    /// Resolve every attribute of `asset`, which sits at `depth`. Returns the
    /// resolved asset and its height.
    fn resolve_asset(&mut self, asset: Asset, depth: usize) -> AssetResult<(Asset, usize)> {
        self.path.push(asset.key().to_string());
        let mut attrs = Map::new();
        let mut height = 0;
        for (name, value) in asset.attrs() {
            let (resolved, h) = self.resolve_value(value, depth)?;
            height = height.max(h);
            attrs.insert(name.clone(), resolved);
        }
        self.path.pop();
        Ok((asset.with_attrs(attrs), height))
    }

    fn resolve_value(&mut self, value: &Value, depth: usize) -> AssetResult<(Value, usize)> {
        match value {
            Value::Object(obj) if is_reference_object(obj) => {
                let key = Key::from_object(self.schema, obj)?;
                let (resolved, h) = self.resolve_reference(key, depth + 1)?;
                Ok((resolved, h + 1))
            }
            Value::Object(obj) => {
                let mut out = Map::new();
                let mut height = 0;
                for (k, v) in obj {
                    let (resolved, h) = self.resolve_value(v, depth)?;
                    height = height.max(h);
                    out.insert(k.clone(), resolved);
                }
                Ok((Value::Object(out), height))
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                let mut height = 0;
                for item in items {
                    let (resolved, h) = self.resolve_value(item, depth)?;
                    height = height.max(h);
                    out.push(resolved);
                }
                Ok((Value::Array(out), height))
            }
            other => Ok((other.clone(), 0)),
        }
    }

    fn resolve_reference(&mut self, key: Key, depth: usize) -> AssetResult<(Value, usize)> {
        let id = key.key().to_string();
        if self.path.contains(&id) {
            let mut path = self.path.clone();
            path.push(id);
            return Err(AssetError::CyclicReference { path });
        }
        self.check_depth(depth)?;
        if let Some(done) = self.arena.get(&id) {
            // The reused subtree must fit below this occurrence too.
            self.check_depth(depth + done.height)?;
            trace!(key = %id, depth, "reusing resolved reference");
            return Ok((done.value.clone(), done.height));
        }

        trace!(key = %id, depth, "resolving reference");
        let asset = key
            .get(self.port, self.schema)
            .map_err(|source| AssetError::Reference {
                from: id.clone(),
                source: Box::new(source),
            })?;
        let (asset, height) = self.resolve_asset(asset, depth)?;
        let value = asset.to_value();
        self.arena.insert(
            id,
            Resolved {
                value: value.clone(),
                height,
            },
        );
        Ok((value, height))
    }
}
