//! Native demo: the terrain and globe backdrops in two windows. Scroll the mouse wheel over
//! either window to move through a virtual page and switch between them.

fn main() -> anyhow::Result<()> {
    alpine_backdrop::run()
}
