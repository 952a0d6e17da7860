//! Reference factories for the fixture entities.
//!
//! Generators keep the crate's contract: unique snowflake ids and hashed
//! secret fields, randomized defaults for everything else.

use fake::Fake;
use fake::faker::internet::en::Username;
use fake::faker::name::en::Name;
use md5::{Digest, Md5};

use crudforge::FactoryRegistry;

use super::{member, role};

pub const DEFAULT_SEED_PASSWORD: &str = "changeme";

/// Secret-like fields are stored as MD5 hex, never as plaintext.
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Md5::digest(secret.as_bytes()))
}

pub fn registry() -> FactoryRegistry {
    let mut registry = FactoryRegistry::new();
    registry.register("role", |ctx| {
        let id = ctx.next_id();
        role::entity::Model {
            id,
            name: format!("role-{id}"),
        }
    });
    registry.register("member", |ctx| {
        let account: String = Username().fake_with_rng(ctx.rng());
        let display_name: String = ctx.fake(&Name());
        member::entity::Model {
            id: ctx.next_id(),
            account,
            display_name,
            password: hash_secret(DEFAULT_SEED_PASSWORD),
            role_id: 0,
            is_deleted: 0,
        }
    });
    registry
}
