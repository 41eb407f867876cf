use nanoid::nanoid;

const ID_LEN: usize = 8;

/// Short random identifier used for books and goal records.
pub fn generate_id() -> String {
    nanoid!(ID_LEN)
}
