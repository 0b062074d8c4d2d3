/// Build the KV key for an identity's embedding.
/// Format: `{prefix}:emb:{identity}`
pub fn embedding_key(prefix: &str, identity: &str) -> String {
    format!("{prefix}:emb:{identity}")
}

/// Return the KV prefix for listing all embeddings.
/// Format: `{prefix}:emb:`
pub fn embedding_prefix(prefix: &str) -> String {
    format!("{prefix}:emb:")
}

/// Build the KV key for an account record.
/// Format: `{prefix}:acct:{identity}`
pub fn account_key(prefix: &str, identity: &str) -> String {
    format!("{prefix}:acct:{identity}")
}

/// Return the KV prefix for listing all accounts.
/// Format: `{prefix}:acct:`
pub fn account_prefix(prefix: &str) -> String {
    format!("{prefix}:acct:")
}

/// Build the KV key for the username uniqueness index.
/// Format: `{prefix}:user:{username}`
pub fn username_key(prefix: &str, username: &str) -> String {
    format!("{prefix}:user:{username}")
}
