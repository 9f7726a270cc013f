// src/services/mod.rs
//
// Services Module - Orchestration Layer
//
// Flows that span several repositories or maintain derived state.

pub mod aggregate_service;
pub mod serial_service;
pub mod user_service;

pub use aggregate_service::AggregateService;
pub use serial_service::SerialService;
pub use user_service::{NewUser, UserService};

use std::sync::Arc;

use crate::repositories::Repositories;

/// Services wired over one set of repositories.
pub struct Services {
    pub aggregates: Arc<AggregateService>,
    pub users: UserService,
    pub serials: SerialService,
}

impl Services {
    pub fn new(repos: &Repositories) -> Self {
        let aggregates = Arc::new(AggregateService::new(
            Arc::clone(&repos.serials),
            Arc::clone(&repos.statistic),
        ));

        let users = UserService::new(
            Arc::clone(&repos.users),
            Arc::clone(&repos.favourites),
            Arc::clone(&repos.serials),
            Arc::clone(&repos.serial_favourites),
            Arc::clone(&repos.serial_users),
            Arc::clone(&repos.comments),
            Arc::clone(&aggregates),
        );

        let serials = SerialService::new(
            Arc::clone(&repos.serials),
            Arc::clone(&repos.seasons),
            Arc::clone(&repos.episodes),
            Arc::clone(&repos.favourites),
            Arc::clone(&repos.serial_actors),
            Arc::clone(&repos.serial_favourites),
            Arc::clone(&repos.serial_users),
            Arc::clone(&repos.comments),
            Arc::clone(&aggregates),
        );

        Self {
            aggregates,
            users,
            serials,
        }
    }
}
