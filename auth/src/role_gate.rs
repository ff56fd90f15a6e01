//! Presentation-level capability checks. A denied action is simply not run; there is no
//! error and nothing is recorded. Server-side authorization is separate.

use std::future::Future;

/// The roles allowed to perform an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedRoles<R> {
    One(R),
    Any(Vec<R>),
}

impl<R> From<R> for AllowedRoles<R> {
    fn from(role: R) -> Self {
        AllowedRoles::One(role)
    }
}

impl<R> From<Vec<R>> for AllowedRoles<R> {
    fn from(roles: Vec<R>) -> Self {
        AllowedRoles::Any(roles)
    }
}

impl<R, const N: usize> From<[R; N]> for AllowedRoles<R> {
    fn from(roles: [R; N]) -> Self {
        AllowedRoles::Any(Vec::from(roles))
    }
}

impl<R: PartialEq> AllowedRoles<R> {
    pub fn permits(&self, role: &R) -> bool {
        match self {
            AllowedRoles::One(allowed) => allowed == role,
            AllowedRoles::Any(allowed) => allowed.contains(role),
        }
    }
}

pub fn is_permitted<R: PartialEq>(allowed: impl Into<AllowedRoles<R>>, role: &R) -> bool {
    allowed.into().permits(role)
}

/// Run `action` only if `role` is allowed, returning `None` without running it otherwise.
pub async fn gate<R, T, F, Fut>(allowed: impl Into<AllowedRoles<R>>, role: &R, action: F) -> Option<T>
where
    R: PartialEq,
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    if is_permitted(allowed, role) {
        Some(action().await)
    } else {
        None
    }
}
