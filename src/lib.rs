//! One-to-one resource allocation under adversarial envy.
//!
//! Every settler of a colony must receive exactly one distinct resource.
//! Settlers rank all resources and detest some other settlers; a settler
//! is *jealous* when an adversary holds a resource it ranks above its
//! own. This crate models colonies and fills their allocation with three
//! strategies that trade speed for envy.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Settler`, `Resource`, `AllocationSnapshot`
//! - **`simulation`**: The `Simulation` aggregate, envy computation, random colonies
//! - **`validation`**: Stability checks (counts, complete preference rankings)
//! - **`dispatching`**: `Dispatcher` with linear, MAX-LEF and switch strategies
//! - **`kpi`**: Envy metrics of a finished allocation
//! - **`io`**: Colony file reader and assignment writer
//! - **`command`**: Line commands and interactive sessions
//! - **`error`**: Error types
//!
//! # Example
//!
//! ```
//! use u_colony::dispatching::{DispatchConfig, DispatchStrategy, Dispatcher};
//! use u_colony::io::parse_colony;
//!
//! let mut sim = parse_colony(
//!     "colon(A). colon(B). ressource(X). ressource(Y).
//!      deteste(A,B).
//!      preferences(A,X,Y). preferences(B,X,Y).",
//! )
//! .unwrap();
//!
//! let config = DispatchConfig::new(DispatchStrategy::MaxLef).with_seed(42);
//! let report = Dispatcher::from_config(&mut sim, &config).run(&config).unwrap();
//! assert_eq!(report.jealous, 1);
//! assert!(sim.is_fully_assigned());
//! ```
//!
//! # References
//!
//! - Beynier et al. (2019), "Local envy-freeness in house allocation problems"
//! - Abdulkadiroğlu & Sönmez (1999), "House allocation with existing tenants"

pub mod command;
pub mod dispatching;
pub mod error;
pub mod io;
pub mod kpi;
pub mod models;
pub mod simulation;
pub mod validation;
