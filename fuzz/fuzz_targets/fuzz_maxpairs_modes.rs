#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use seqmatch::index::encseq::{Alphabet, SEPARATOR, WILDCARD};
use seqmatch::index::suffix_array::SortConfig;
use seqmatch::maxpairs::check_sample;

#[derive(Debug, Arbitrary)]
struct Input {
    db: Vec<u8>,
    query: Vec<u8>,
    minlength: u8,
}

/// Map arbitrary bytes onto DNA codes with the odd special symbol
fn symbols(raw: &[u8]) -> Vec<u8> {
    raw.iter()
        .map(|&b| match b % 16 {
            0 => SEPARATOR,
            1 => WILDCARD,
            c => c % 4,
        })
        .collect()
}

fuzz_target!(|input: Input| {
    let db = symbols(&input.db);
    let query = symbols(&input.query);
    if db.is_empty() || query.is_empty() {
        return;
    }
    let minlength = (input.minlength % 8) as usize + 1;
    let check = check_sample(&db, &query, minlength, &Alphabet::dna(), &SortConfig::default())
        .expect("matching failed");
    assert!(check.agree(), "{:?}", check);
});
