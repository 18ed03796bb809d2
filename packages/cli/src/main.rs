mod cmds;
mod config;

#[cu::cli]
fn main(args: cmds::CmdMain) -> cu::Result<()> {
    cmds::main(args)
}
