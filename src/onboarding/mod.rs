//! Become-a-punter onboarding form.
//!
//! The form loads the signed-in user once, lets them pick a username (checked
//! against the backend), a category pair, and a weekly price, and posts the
//! registration. `OnboardingController` owns the async side; `FormState` is
//! the plain field bookkeeping it guards.

pub mod category;
pub mod controller;
pub mod form;
pub mod navigation;
pub mod notify;
pub mod scope;
pub mod state;

pub use category::{PrimaryCategory, secondary_options};
pub use controller::{FormSnapshot, OnboardingController, OnboardingSettings, SUCCESS_MESSAGE};
pub use form::{FormState, UsernameStatus, parse_price};
pub use navigation::{Navigator, RecordingNavigator};
pub use notify::{Notifier, Toast, ToastEvent, ToastKind};
pub use scope::ComponentScope;
pub use state::FormPhase;
