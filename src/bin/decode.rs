use env_logger::Env;
use log::warn;
use std::{
    env,
    io::{stdout, BufWriter, Write},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        return Err(format!("usage: {} <save-file> <user-id> [output]", args[0]).into());
    }

    let data = std::fs::read(&args[1])?;
    let save = bl4save::decode(&data, &args[2])?;
    if !save.padding().is_valid() {
        warn!("{} did not carry valid padding", &args[1]);
    }

    match args.get(3) {
        Some(path) => std::fs::write(path, save.text())?,
        None => {
            let stdout = stdout();
            let mut buf_stdout = BufWriter::new(stdout.lock());
            buf_stdout.write_all(save.text().as_bytes())?;
            buf_stdout.flush()?;
        }
    }

    Ok(())
}
