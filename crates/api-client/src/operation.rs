//! Static descriptors for the API's root fields and the query text built from them
//!
//! Every operation is sent as a named GraphQL document whose single root field
//! is the operation itself; the caller supplies the selection set:
//!
//! ```text
//! query FindShow(
//!   $showId: ID!
//! ) {
//!   findShow(
//!     showId: $showId
//!   ) { id name }
//! }
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Query => f.write_str("query"),
            OperationKind::Mutation => f.write_str("mutation"),
        }
    }
}

/// One root field of the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    /// Root field name, also the key of the result under `data`.
    pub name: &'static str,
    /// `(argument, GraphQL type)` pairs in declaration order.
    pub args: &'static [(&'static str, &'static str)],
}

impl Operation {
    /// GraphQL operation name: the field name with its first letter capitalized.
    pub fn operation_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

const fn query(name: &'static str, args: &'static [(&'static str, &'static str)]) -> Operation {
    Operation {
        kind: OperationKind::Query,
        name,
        args,
    }
}

const fn mutation(name: &'static str, args: &'static [(&'static str, &'static str)]) -> Operation {
    Operation {
        kind: OperationKind::Mutation,
        name,
        args,
    }
}

pub const ACCOUNT: Operation = query("account", &[]);
pub const LOGIN: Operation = query(
    "login",
    &[("usernameEmail", "String!"), ("passwordHash", "String!")],
);
pub const LOGIN_REFRESH: Operation = query("loginRefresh", &[("refreshToken", "String!")]);
pub const FIND_SHOW: Operation = query("findShow", &[("showId", "ID!")]);
pub const SEARCH_SHOWS: Operation = query(
    "searchShows",
    &[
        ("search", "String"),
        ("offset", "Int"),
        ("limit", "Int"),
        ("sort", "String"),
    ],
);
pub const FIND_EPISODE: Operation = query("findEpisode", &[("episodeId", "ID!")]);
pub const RECENTLY_ADDED_EPISODES: Operation =
    query("recentlyAddedEpisodes", &[("limit", "Int"), ("offset", "Int")]);

pub const CREATE_ACCOUNT: Operation = mutation(
    "createAccount",
    &[
        ("username", "String!"),
        ("email", "String!"),
        ("passwordHash", "String!"),
        ("recaptchaResponse", "String!"),
    ],
);
pub const CHANGE_PASSWORD: Operation = mutation(
    "changePassword",
    &[
        ("oldPassword", "String!"),
        ("newPassword", "String!"),
        ("confirmNewPassword", "String!"),
    ],
);
pub const RESET_PASSWORD: Operation = mutation(
    "resetPassword",
    &[
        ("passwordResetToken", "String!"),
        ("newPassword", "String!"),
        ("confirmNewPassword", "String!"),
    ],
);
pub const REQUEST_PASSWORD_RESET: Operation = mutation(
    "requestPasswordReset",
    &[("recaptchaResponse", "String!"), ("email", "String!")],
);
pub const VERIFY_EMAIL_ADDRESS: Operation =
    mutation("verifyEmailAddress", &[("validationToken", "String!")]);
pub const RESEND_VERIFICATION_EMAIL: Operation = mutation("resendVerificationEmail", &[]);
pub const DELETE_ACCOUNT_REQUEST: Operation =
    mutation("deleteAccountRequest", &[("passwordHash", "String!")]);

/// Every operation this client knows, for lookup by field name.
pub const OPERATIONS: &[Operation] = &[
    ACCOUNT,
    LOGIN,
    LOGIN_REFRESH,
    FIND_SHOW,
    SEARCH_SHOWS,
    FIND_EPISODE,
    RECENTLY_ADDED_EPISODES,
    CREATE_ACCOUNT,
    CHANGE_PASSWORD,
    RESET_PASSWORD,
    REQUEST_PASSWORD_RESET,
    VERIFY_EMAIL_ADDRESS,
    RESEND_VERIFICATION_EMAIL,
    DELETE_ACCOUNT_REQUEST,
];

pub fn find_operation(name: &str) -> Option<&'static Operation> {
    OPERATIONS.iter().find(|op| op.name == name)
}

/// Render the document for `op` with the caller's selection set.
pub fn build_query(op: &Operation, selection: &str) -> String {
    let operation_name = op.operation_name();
    if op.args.is_empty() {
        return format!("{} {operation_name} {{\n  {} {selection}\n}}", op.kind, op.name);
    }

    let declarations = op
        .args
        .iter()
        .map(|(name, ty)| format!("${name}: {ty}"))
        .collect::<Vec<_>>()
        .join(", ");
    let passed = op
        .args
        .iter()
        .map(|(name, _)| format!("{name}: ${name}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{} {operation_name}(\n  {declarations}\n) {{\n  {}(\n    {passed}\n  ) {selection}\n}}",
        op.kind, op.name
    )
}
