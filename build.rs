use vergen_gitcl::{Emitter, GitclBuilder};

fn main() -> anyhow::Result<()> {
    let git = GitclBuilder::default().sha(true).branch(true).dirty(false).build()?;

    Emitter::default().add_instructions(&git)?.emit()?;

    Ok(())
}
