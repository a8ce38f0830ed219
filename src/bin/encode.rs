use env_logger::Env;
use log::info;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        return Err(format!("usage: {} <text-file> <user-id> <output>", args[0]).into());
    }

    let text = std::fs::read_to_string(&args[1])?;
    let data = bl4save::encode(&text, &args[2])?;
    std::fs::write(&args[3], &data)?;
    info!("wrote {} bytes to {}", data.len(), &args[3]);
    Ok(())
}
