use trenn::Pattern;
use trenn_stream::{split_into, ByteSource, Error};

fn main() {
    if let Err(err) = main_err() {
        eprintln!("error: {err}");
    }
}

fn main_err() -> Result<(), Error> {
    let stdin = std::io::stdin();

    let separator = Pattern::compile(", *")?;
    let terminator = Pattern::compile("\n")?;

    let mut src = ByteSource::from_read(stdin.lock());
    while !src.is_at_end() {
        let mut fields: Vec<String> = vec![];
        split_into(&mut src, &separator, &terminator, &mut fields)?;
        println!("{fields:?}");
    }
    src.check_io_error()?;
    Ok(())
}
