//! # adsync-ad
//!
//! Active Directory domain types and repositories for adsync.
//!
//! Builds the AD-specific layer on top of [`adsync_directory`]: the typed
//! entry kinds (users and groups with their common attribute block),
//! convenience repositories for the usual directory queries, password
//! handling, and the attribute maps used to mirror entries into an
//! external account system.
//!
//! ## Example
//!
//! ```ignore
//! use adsync_ad::prelude::*;
//!
//! let tree = AdTree::new(
//!     LdapConfig::new("dc1.example.com", "dc=example,dc=com",
//!         "cn=sync,dc=example,dc=com")
//!         .with_password("secret")
//!         .with_tls(),
//! )?;
//! tree.connect().await?;
//!
//! let users = tree.users();
//! if let Some(user) = users.query_user_by_account_name("alice").await? {
//!     let attrs = map_user_for_account(&user, &default_user_mapping())?;
//!     // hand `attrs` to the account system...
//! }
//! ```

pub mod entry;
pub mod group;
pub mod groups;
pub mod password;
pub mod provision;
pub mod tree;
pub mod user;
pub mod users;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use adsync_directory::prelude::*;

    pub use crate::entry::AdEntry;
    pub use crate::group::{AdGroup, GROUP_TYPE_SECURITY_ENABLED};
    pub use crate::groups::GroupsRepository;
    pub use crate::password::{encode_password, require_encrypted};
    pub use crate::provision::{
        apply_account_changes, default_group_mapping, default_user_mapping,
        map_user_for_account,
    };
    pub use crate::tree::AdTree;
    pub use crate::user::{AdUser, UAC_ACCOUNT_DISABLE, UAC_NORMAL_ACCOUNT};
    pub use crate::users::UsersRepository;
}
