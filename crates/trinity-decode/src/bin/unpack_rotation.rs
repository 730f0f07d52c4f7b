//! Decode a 48-bit packed rotation from the command line.
//!
//! Run: `cargo run -p trinity-decode --features demo-tools --bin unpack_rotation -- <x> <y> <z>`
//!
//! The three words may be decimal or `0x`-prefixed hex. Set
//! `RUST_LOG=trace` to see the intermediate bit fields.

use std::env;
use std::num::ParseIntError;

use trinity_decode::unpack_rotation;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let [x, y, z] = args.as_slice() else {
        eprintln!("usage: unpack_rotation <x> <y> <z>");
        std::process::exit(1);
    };

    let mut words = [0_u16; 3];
    for (slot, arg) in words.iter_mut().zip([x, y, z]) {
        match parse_word(arg) {
            Ok(word) => *slot = word,
            Err(e) => {
                eprintln!("invalid word {arg:?}: {e}");
                std::process::exit(1);
            }
        }
    }

    let q = unpack_rotation(words[0], words[1], words[2]);
    println!("quaternion (w, x, y, z): ({}, {}, {}, {})", q.w, q.x, q.y, q.z);
}

fn parse_word(arg: &str) -> Result<u16, ParseIntError> {
    arg.strip_prefix("0x").map_or_else(
        || arg.parse(),
        |hex| u16::from_str_radix(hex, 16),
    )
}
