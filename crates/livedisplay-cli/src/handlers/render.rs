use anyhow::Result;
use is_terminal::IsTerminal;
use livedisplay_engine::{render, to_ascii};
use owo_colors::OwoColorize;

pub fn handle(text: &str, lit: char, unlit: char) -> Result<()> {
    let stream = render(text);
    let ascii = to_ascii(&stream, lit, unlit);

    if std::io::stdout().is_terminal() {
        for line in ascii.lines() {
            let colored: String = line
                .chars()
                .map(|ch| {
                    if ch == lit {
                        ch.bright_red().to_string()
                    } else {
                        ch.bright_black().to_string()
                    }
                })
                .collect();
            println!("{}", colored);
        }
    } else {
        println!("{}", ascii);
    }

    println!("Stream length: {}", stream.len());
    Ok(())
}
