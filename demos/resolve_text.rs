use signflow::ClipStore;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let root = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: resolve_text <content-root> <text>"))?;
    let text = args.collect::<Vec<_>>().join(" ");

    let store = ClipStore::new(root);
    let resolution = signflow::resolve(&text, &store);

    for unit in &resolution.units {
        println!("{unit:?}");
    }
    for warning in &resolution.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}
