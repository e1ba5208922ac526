// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parses a handful of dependency specs and prints their round-tripped form.

use crucible_resolve::Dep;

fn main() {
    let specs = [
        "libc",
        "libc(+dev)",
        "[-static] gcc >=4.8 <=9 (+lto ~pgo)",
        "[+qt && -gtk] toolkit (?theme(+dark))",
    ];

    for spec in specs {
        match spec.parse::<Dep>() {
            Ok(dep) => println!("{:<45} -> {}", spec, dep),
            Err(err) => eprintln!("{:<45} -> error: {}", spec, err),
        }
    }
}
