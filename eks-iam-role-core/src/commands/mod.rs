//! Commands module - reconcilers and the service layer that composes them

pub(crate) mod issuer;
pub(crate) mod policy;
pub(crate) mod reconcile;
pub(crate) mod role;
pub(crate) mod service;

pub use issuer::ClusterIssuerResolver;
pub use policy::PolicyReconciler;
pub use reconcile::reconcile;
pub use role::RoleReconciler;
pub use service::EksIamRoleService;
