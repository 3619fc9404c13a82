use slotcast_core::Config;

use super::CommandResult;

pub fn run(text: &[String]) -> CommandResult {
    let tagger = Config::load()?.tagger.build();
    println!("{}", tagger.infer_tag(&text.join(" ")));
    Ok(())
}
