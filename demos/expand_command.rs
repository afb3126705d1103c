//! Expand a build command and show how failures are reported.

use cmdexpand::{Environment, ExpandErrorKind, expand};

fn main() {
    let env: Environment = [
        ("IDIR", "/tmp/cov idir"),
        ("BUILD", "make -j$JOBS"),
        ("JOBS", "8"),
        ("LOOP", "$LOOP"),
    ]
    .into_iter()
    .collect();

    match expand("cov-build --dir \"$IDIR\" $BUILD", &env) {
        Ok(args) => println!("Arguments: {args:?}"),
        Err(e) => println!("Error: {e}"),
    }

    println!();

    for input in ["run $LOOP", "run $MISSING", "run 'unclosed"] {
        match expand(input, &env) {
            Ok(args) => println!("{input}: {args:?} (unexpected)"),
            Err(e) => {
                println!("{input}: {e}");
                if let ExpandErrorKind::CyclicReference { path } = &e.kind {
                    println!("  Chain: {}", path.join(" -> "));
                }
            }
        }
    }
}
