use crate::feed::Load;

/// Render one load as its broadcast message. Markdown bold markers are part
/// of the template; feed values are inserted verbatim, so markup-significant
/// characters in addresses can render oddly.
pub fn format_load(load: &Load) -> String {
    let mut message = format!(
        "\n*Load ID:* {}\n*Total Distance:* {} Miles\n\n*Start:* {}\n*End:*   {}\n",
        load.load_id, load.total_distance, load.load_start_date_str, load.load_end_date_str
    );

    for (i, stop) in load.stops.iter().enumerate() {
        message.push_str(&format!("\n*Stop {}:* {}", i + 1, stop.address));
    }

    message
}
