//! Factory registry for synthetic seed data.
//!
//! A registry owns an entity-kind → generator table, built once from the
//! factory declarations a seed setup registers. Generators receive a
//! [`SeedContext`] (RNG plus id generation) and produce one record with
//! randomized defaults; callers layer overrides on top through
//! [`BoundFactory::make_with`].
//!
//! Generator authors are expected to produce globally-unique identities
//! (see [`snowflake_id`]) and to hash secret-like fields before returning —
//! the resolver does not enforce either.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::errors::ApiError;

/// Custom epoch for generated ids: 2020-01-01T00:00:00Z.
const ID_EPOCH_MILLIS: u64 = 1_577_836_800_000;

static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Unique 64-bit id: millisecond timestamp in the high bits, a process-wide
/// sequence in the low 22 bits.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn snowflake_id() -> i64 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as u64)
        .saturating_sub(ID_EPOCH_MILLIS);
    let sequence = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed) & 0x3F_FFFF;
    ((millis << 22) | sequence) as i64
}

/// Per-run randomness and id generation handed to generators.
pub struct SeedContext {
    rng: StdRng,
}

impl SeedContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic context for reproducible fixtures.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// RNG for use with `fake` generators:
    /// `Name().fake_with_rng(ctx.rng())`.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Produce a fake value from this context's RNG:
    /// `let name: String = ctx.fake(&Name());`
    pub fn fake<T, U>(&mut self, faker: &T) -> U
    where
        U: fake::Dummy<T>,
    {
        U::dummy_with_rng(faker, &mut self.rng)
    }

    /// Next unique record id.
    pub fn next_id(&mut self) -> i64 {
        snowflake_id()
    }
}

impl Default for SeedContext {
    fn default() -> Self {
        Self::new()
    }
}

type ErasedGenerator = dyn Fn(&mut SeedContext) -> Box<dyn Any> + Send + Sync;

/// Entity-kind → generator table. Owned by the seed setup that builds it and
/// passed into the runner explicitly.
#[derive(Default)]
pub struct FactoryRegistry {
    generators: HashMap<String, Box<ErasedGenerator>>,
}

impl FactoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a generator for an entity kind. Re-registering a kind
    /// replaces the previous generator.
    pub fn register<M: 'static>(
        &mut self,
        kind: impl Into<String>,
        generator: impl Fn(&mut SeedContext) -> M + Send + Sync + 'static,
    ) {
        self.generators
            .insert(kind.into(), Box::new(move |ctx| Box::new(generator(ctx))));
    }

    #[must_use]
    pub fn has(&self, kind: &str) -> bool {
        self.generators.contains_key(kind)
    }

    /// Look up the generator for an entity kind.
    ///
    /// # Errors
    ///
    /// Fails with `UnknownFactory` when the kind was never registered.
    pub fn resolve<'a>(&'a self, kind: &str) -> Result<BoundFactory<'a>, ApiError> {
        self.generators
            .get(kind)
            .map(|generator| BoundFactory {
                kind: kind.to_string(),
                generator,
            })
            .ok_or_else(|| ApiError::unknown_factory(kind))
    }
}

/// A resolved generator, ready to produce records.
pub struct BoundFactory<'a> {
    kind: String,
    generator: &'a ErasedGenerator,
}

impl std::fmt::Debug for BoundFactory<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundFactory")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl BoundFactory<'_> {
    /// Produce one record with randomized defaults.
    ///
    /// # Errors
    ///
    /// Fails with `UnknownFactory` when `M` is not the record type this
    /// factory was registered with.
    pub fn make<M: 'static>(&self, ctx: &mut SeedContext) -> Result<M, ApiError> {
        (self.generator)(ctx)
            .downcast::<M>()
            .map(|record| *record)
            .map_err(|_| {
                ApiError::unknown_factory(format!(
                    "{} (requested record type does not match)",
                    self.kind
                ))
            })
    }

    /// Produce one record, layering caller overrides on top of the
    /// randomized defaults.
    ///
    /// # Errors
    ///
    /// Fails with `UnknownFactory` on a record-type mismatch.
    pub fn make_with<M: 'static>(
        &self,
        ctx: &mut SeedContext,
        overrides: impl FnOnce(&mut M),
    ) -> Result<M, ApiError> {
        let mut record = self.make::<M>(ctx)?;
        overrides(&mut record);
        Ok(record)
    }

    /// Produce `count` records.
    ///
    /// # Errors
    ///
    /// Fails with `UnknownFactory` on a record-type mismatch.
    pub fn make_many<M: 'static>(
        &self,
        ctx: &mut SeedContext,
        count: usize,
    ) -> Result<Vec<M>, ApiError> {
        self.make_many_with(ctx, count, |_, _| {})
    }

    /// Produce `count` records with an index-aware override, for wiring
    /// relationships across a batch.
    ///
    /// # Errors
    ///
    /// Fails with `UnknownFactory` on a record-type mismatch.
    pub fn make_many_with<M: 'static>(
        &self,
        ctx: &mut SeedContext,
        count: usize,
        mut overrides: impl FnMut(usize, &mut M),
    ) -> Result<Vec<M>, ApiError> {
        let mut records = Vec::with_capacity(count);
        for index in 0..count {
            records.push(self.make_with(ctx, |record| overrides(index, record))?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Widget {
        id: i64,
        label: String,
    }

    fn registry() -> FactoryRegistry {
        let mut registry = FactoryRegistry::new();
        registry.register("widget", |ctx| Widget {
            id: ctx.next_id(),
            label: "widget".to_string(),
        });
        registry
    }

    #[test]
    fn unregistered_kind_fails_with_unknown_factory() {
        let registry = registry();
        let err = registry.resolve("gadget").unwrap_err();
        assert!(matches!(err, ApiError::UnknownFactory { .. }));
    }

    #[test]
    fn repeated_makes_produce_unique_identities() {
        let registry = registry();
        let factory = registry.resolve("widget").unwrap();
        let mut ctx = SeedContext::seeded(7);
        let a: Widget = factory.make(&mut ctx).unwrap();
        let b: Widget = factory.make(&mut ctx).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn overrides_layer_on_top_of_defaults() {
        let registry = registry();
        let factory = registry.resolve("widget").unwrap();
        let mut ctx = SeedContext::seeded(7);
        let widget: Widget = factory
            .make_with(&mut ctx, |w: &mut Widget| w.label = "custom".to_string())
            .unwrap();
        assert_eq!(widget.label, "custom");
        assert_ne!(widget.id, 0);
    }

    #[test]
    fn wrong_record_type_is_reported() {
        let registry = registry();
        let factory = registry.resolve("widget").unwrap();
        let mut ctx = SeedContext::seeded(7);
        let err = factory.make::<String>(&mut ctx).unwrap_err();
        assert!(matches!(err, ApiError::UnknownFactory { .. }));
    }

    #[test]
    fn batch_overrides_receive_the_index() {
        let registry = registry();
        let factory = registry.resolve("widget").unwrap();
        let mut ctx = SeedContext::seeded(7);
        let widgets: Vec<Widget> = factory
            .make_many_with(&mut ctx, 3, |index, w: &mut Widget| w.label = format!("widget-{index}"))
            .unwrap();
        assert_eq!(widgets.len(), 3);
        assert_eq!(widgets[2].label, "widget-2");
    }

    #[test]
    fn snowflake_ids_are_monotonic_within_a_burst() {
        let first = snowflake_id();
        let second = snowflake_id();
        assert!(second > first);
    }
}
