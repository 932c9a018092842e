//! Release description attached to each uploaded transcode.

use crate::release::SourceRelease;
use crate::tracker::torrent_permalink;

pub const PROJECT_URL: &str = "https://github.com/lfence/red-trul";

/// BBCode provenance note: source torrent, command used, and toolchain.
pub fn release_description(source: &SourceRelease, command_template: &str) -> String {
    format!(
        "[b][code]transcode source:[/code][/b] [url={permalink}][code]{format} / {encoding}[/code][/url]\n\
         [b][code]transcode command:[/code][/b] [code]{command}[/code]\n\
         [b][code]transcode toolchain:[/code][/b] [url={project}][code]{toolchain}[/code][/url]",
        permalink = torrent_permalink(source.id),
        format = source.format,
        encoding = source.encoding,
        command = command_template,
        project = PROJECT_URL,
        toolchain = crate::TOOLCHAIN_SIGNATURE,
    )
}
