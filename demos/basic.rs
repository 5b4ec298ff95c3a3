// Demo: drive a large list through a few scroll commands and print what gets realized.
use fixed_stack::{
    Align, ContainerGenerator, FixedStackLayout, LayoutOptions, RecyclingGenerator, ScrollInfo,
    Size,
};

fn main() -> Result<(), fixed_stack::LayoutError> {
    let options = LayoutOptions::new(24.0).with_on_scroll_info_changed(Some(|info: ScrollInfo| {
        println!(
            "scroll info: offset={:.1} viewport={:.1} extent={:.1}",
            info.offset.y, info.viewport.height, info.extent.height
        );
    }));
    let mut layout = FixedStackLayout::new(options);
    let rows = (0..1_000_000).map(|i| format!("row {i}")).collect();
    let mut generator = RecyclingGenerator::new(rows);
    let viewport = Size::new(320.0, 240.0);

    layout.measure(&mut generator, viewport)?;
    layout.arrange(&mut generator, viewport);
    print_realized(&layout, &generator);

    layout.page_down();
    layout.mouse_wheel_down();
    layout.measure(&mut generator, viewport)?;
    layout.arrange(&mut generator, viewport);
    print_realized(&layout, &generator);

    layout.make_visible(999_999, Align::End);
    layout.measure(&mut generator, viewport)?;
    layout.arrange(&mut generator, viewport);
    print_realized(&layout, &generator);

    println!(
        "containers created={} reused={} (items={})",
        generator.stats().created,
        generator.stats().reused,
        generator.item_count()
    );
    Ok(())
}

fn print_realized(
    layout: &FixedStackLayout<fixed_stack::ContainerId>,
    generator: &RecyclingGenerator<String>,
) {
    for index in layout.realized_indexes() {
        let Some(&container) = layout.container_for(index) else {
            continue;
        };
        let y = generator
            .slot(container)
            .and_then(|slot| slot.rect)
            .map_or(0.0, |rect| rect.y);
        let label = generator.item_for(container).map_or("?", String::as_str);
        println!("  {index:>7} y={y:>7.1} {label}");
    }
}
