/// normalises the operation group id returned by the injection endpoint,
/// which comes back as a json string followed by a newline
pub fn clear_rpc_operation_group_hash(hash: &str) -> String {
    hash.replace('"', "").replacen('\n', "", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_rpc_operation_group_hash() {
        assert_eq!(clear_rpc_operation_group_hash("\"abc123\"\n"), "abc123");
        assert_eq!(
            clear_rpc_operation_group_hash("\"oo\"\"pp\"\nq\n"),
            "ooppq\n"
        );
        assert_eq!(clear_rpc_operation_group_hash("plain"), "plain");
        assert_eq!(clear_rpc_operation_group_hash(""), "");
    }
}
