//! Whoami command implementation

use super::CommandContext;
use crate::output_types::WhoamiOutput;
use anyhow::Result;

pub fn execute(ctx: &CommandContext) -> Result<()> {
    let actor = ctx.backend.session.actor()?;

    if ctx.output.is_json() {
        return ctx.output.result(WhoamiOutput {
            id: actor.id.to_string(),
            name: actor.name,
            email: actor.email,
            role: actor.role.to_string(),
        });
    }

    ctx.output.section("Signed in");
    ctx.output.kv("Name", &actor.name);
    ctx.output.kv("Email", &actor.email);
    ctx.output.kv("Role", &actor.role);
    ctx.output.kv("Id", &actor.id);
    Ok(())
}
