//! Principal identities and their allow-list line form.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod codec;

pub use principal::{Identity, KIND_LEGACY, KIND_GSS, KIND_SUPERUSER, LOCALAUTH_NAME, NOAUTH_NAME};
pub use codec::{decode_line, encode_line, USERLIST_MAXLINESIZE};
