use fa2_micheline_utils::Micheline;

/// smallest balance minted to the target, in token units
pub const MIN_TOKEN_BALANCE: u64 = 1;
pub const TOKEN_DECIMALS: u64 = 8;
pub const TOKEN_NAME: &str = "Token 0";
pub const TOKEN_SYMBOL: &str = "TK0";
pub const TOKEN_EXTRA: u64 = 0;

pub const MINT_ENTRYPOINT: &str = "default";
pub const SET_ADMINISTRATOR_ENTRYPOINT: &str = "set_administrator";

/// `Pair (Pair "<owner>" (Pair 0 {})) (Pair (Pair Unit {}) (Pair False {}))`
pub fn initial_storage(owner: &str) -> Micheline {
    Micheline::pair(
        Micheline::pair(
            Micheline::string(owner),
            Micheline::pair(Micheline::int(0), Micheline::empty_seq()),
        ),
        Micheline::pair(
            Micheline::pair(Micheline::unit(), Micheline::empty_seq()),
            Micheline::pair(Micheline::bool(false), Micheline::empty_seq()),
        ),
    )
}

/// `Left (Right (Left (Pair (Pair "<target>" (Pair 1 8)) (Pair "Token 0" (Pair "TK0" 0)))))`
pub fn mint_parameters(target: &str) -> Micheline {
    let mint = Micheline::pair(
        Micheline::pair(
            Micheline::string(target),
            Micheline::pair(
                Micheline::int(MIN_TOKEN_BALANCE),
                Micheline::int(TOKEN_DECIMALS),
            ),
        ),
        Micheline::pair(
            Micheline::string(TOKEN_NAME),
            Micheline::pair(Micheline::string(TOKEN_SYMBOL), Micheline::int(TOKEN_EXTRA)),
        ),
    );

    Micheline::left(Micheline::right(Micheline::left(mint)))
}

/// new administrator in michelson notation, e.g. `"tz1..."`
pub fn set_administrator_parameter(target: &str) -> String {
    Micheline::string(target).to_michelson()
}
