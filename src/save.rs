use crate::builder::CK2_HEADER;
use crate::{Ck2Parser, Date, Error};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Directory under the user's documents folder where CK2 writes saves
const SAVE_PATH_SUFFIX: [&str; 3] = ["Paradox Interactive", "Crusader Kings II", "save games"];

/// Returns the default CK2 save game directory, if the platform has a
/// documents folder
///
/// ```
/// if let Some(dir) = ck2json::save_game_location() {
///     assert!(dir.ends_with("save games"));
/// }
/// ```
pub fn save_game_location() -> Option<PathBuf> {
    dirs::document_dir().map(|dir| SAVE_PATH_SUFFIX.iter().fold(dir, |acc, x| acc.join(x)))
}

/// The player's character reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Player {
    pub id: i64,

    #[serde(rename = "type")]
    pub kind: i64,
}

/// A converted CK2 save with typed access to its well known fields.
///
/// Accessors return `None` when a field is absent or holds a value of a
/// different type.
///
/// ```
/// use ck2json::{Date, SaveGame};
///
/// # fn main() -> Result<(), ck2json::Error> {
/// let data = b"CK2txt\nversion=\"2.8.3.4\"\ndate=1066.9.15\nplayer_age=34\n}\n";
/// let save = SaveGame::from_slice(&data[..])?;
/// assert_eq!(save.version(), Some("2.8.3.4"));
/// assert_eq!(save.date(), Some(Date::from_ymd(1066, 9, 15)));
/// assert_eq!(save.player_age(), Some(34));
/// assert_eq!(save.player_name(), None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SaveGame {
    game_state: Value,
}

impl SaveGame {
    /// Converts a save read from `reader` on a background thread
    pub fn parse<R>(reader: R) -> Result<Self, Error>
    where
        R: Read + Send + 'static,
    {
        let json = Ck2Parser::new().convert(reader, Vec::with_capacity(0x1000))?;
        SaveGame::from_json(&json)
    }

    /// Converts an in-memory save
    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        let json = Ck2Parser::new().convert_slice(data)?;
        SaveGame::from_json(&json)
    }

    /// Opens and converts a save file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path)?;
        SaveGame::parse(file)
    }

    fn from_json(json: &[u8]) -> Result<Self, Error> {
        let game_state = serde_json::from_slice(json)?;
        Ok(SaveGame { game_state })
    }

    /// The whole converted document, `{"CK2txt":{...}}`
    pub fn game_state(&self) -> &Value {
        &self.game_state
    }

    pub fn into_game_state(self) -> Value {
        self.game_state
    }

    /// Deserializes the body of the save into a caller defined structure
    ///
    /// ```
    /// use ck2json::SaveGame;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Meta {
    ///     version: String,
    ///     is_zeus_save: bool,
    /// }
    ///
    /// # fn main() -> Result<(), ck2json::Error> {
    /// let data = b"CK2txt\nversion=\"2.8.3.4\"\nis_zeus_save=yes\n}\n";
    /// let meta: Meta = SaveGame::from_slice(&data[..])?.deserialize()?;
    /// assert_eq!(meta.version, "2.8.3.4");
    /// assert!(meta.is_zeus_save);
    /// # Ok(())
    /// # }
    /// ```
    pub fn deserialize<T>(&self) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let body = self.body().cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(body)?)
    }

    fn body(&self) -> Option<&Value> {
        self.game_state.get(CK2_HEADER)
    }

    fn get(&self, field: &str) -> Option<&Value> {
        self.body()?.get(field)
    }

    fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field)?.as_str()
    }

    pub fn version(&self) -> Option<&str> {
        self.get_str("version")
    }

    /// The in-game date the save was made
    pub fn date(&self) -> Option<Date> {
        Date::parse(self.get_str("date")?)
    }

    pub fn player(&self) -> Option<Player> {
        Player::deserialize(self.get("player")?).ok()
    }

    pub fn player_name(&self) -> Option<&str> {
        self.get_str("player_name")
    }

    pub fn player_realm(&self) -> Option<&str> {
        self.get_str("player_realm")
    }

    pub fn player_age(&self) -> Option<i64> {
        self.get("player_age")?.as_i64()
    }

    pub fn count(&self) -> Option<i64> {
        self.get("count")?.as_i64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    const DATA: &[u8] = b"CK2txt\nversion=\"2.8.3.4\"\ndate=\"1066.9.15\"\nplayer=\n{\n\tid=140\n\ttype=45\n}\nplayer_realm=\"k_france\"\nplayer_name=\"Philippe\"\nplayer_age=6\ncount=1200\n}\n";

    #[test]
    fn typed_accessors() {
        let save = SaveGame::from_slice(DATA).unwrap();
        assert_eq!(save.version(), Some("2.8.3.4"));
        assert_eq!(save.date(), Some(Date::from_ymd(1066, 9, 15)));
        assert_eq!(save.player(), Some(Player { id: 140, kind: 45 }));
        assert_eq!(save.player_realm(), Some("k_france"));
        assert_eq!(save.player_name(), Some("Philippe"));
        assert_eq!(save.player_age(), Some(6));
        assert_eq!(save.count(), Some(1200));
    }

    #[test]
    fn threaded_parse_matches_slice() {
        let threaded = SaveGame::parse(std::io::Cursor::new(DATA.to_vec())).unwrap();
        assert_eq!(threaded, SaveGame::from_slice(DATA).unwrap());
    }

    #[test]
    fn mistyped_fields_are_none() {
        let save = SaveGame::from_slice(b"CK2txt\nversion=2\nplayer_age=old\nplayer={a b}\n").unwrap();
        assert_eq!(save.version(), None);
        assert_eq!(save.player_age(), None);
        assert_eq!(save.player(), None);
        assert_eq!(save.date(), None);
    }

    #[test]
    fn conversion_errors_surface() {
        let err = SaveGame::from_slice(b"EU4txt\n").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MalformedHeader { .. }));
    }

    #[test]
    fn deserialize_errors_are_document_errors() {
        #[derive(Debug, Deserialize)]
        struct Meta {
            #[allow(dead_code)]
            count: String,
        }

        let save = SaveGame::from_slice(DATA).unwrap();
        let err = save.deserialize::<Meta>().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Document(_)));
    }

    #[test]
    fn missing_file() {
        let err = SaveGame::open("does/not/exist.ck2").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Io(_)));
    }

    #[test]
    fn location_suffix() {
        if let Some(dir) = save_game_location() {
            assert!(dir.ends_with(Path::new("Paradox Interactive/Crusader Kings II/save games")));
        }
    }
}
