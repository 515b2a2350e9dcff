use super::model::{AlbumRef, Track};

/// An album and the tracks that reference it, in library order.
#[derive(Debug, Clone)]
pub struct Album {
    pub album: AlbumRef,
    pub tracks: Vec<Track>,
}

/// Group `tracks` by album folder, keeping the order in which albums first
/// appear. Each album's track list is a ready-made playlist.
pub fn group_albums(tracks: &[Track]) -> Vec<Album> {
    let mut albums: Vec<Album> = Vec::new();
    for track in tracks {
        match albums
            .iter_mut()
            .find(|a| a.album.folder == track.album.folder)
        {
            Some(album) => album.tracks.push(track.clone()),
            None => albums.push(Album {
                album: track.album.clone(),
                tracks: vec![track.clone()],
            }),
        }
    }
    albums
}
