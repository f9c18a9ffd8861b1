// Book texts shared by the integration tests

#![allow(dead_code)]

/// Two-line book from the pagination contract examples
pub const SHORT_CHAPTER_TEXT: &str = "Chapter 1\nHello world. This is a test.";

/// Three English chapters with a preface
pub const ENGLISH_BOOK: &str = "The Voyage\n\nA short preface before the story begins. It has two sentences.\n\nChapter 1\nThe ship left the harbour at dawn. Gulls followed it for a while! Nobody spoke.\nThe captain watched the horizon and said nothing at all for many hours.\n\nChapter 2\nA storm came from the west. Was it going to pass? The crew tied everything down.\nWaves broke over the deck again and again until the night was over.\n\nCHAPTER 3\nMorning was calm. The island appeared, green and quiet, exactly where the map said it would be.\n";

/// Ukrainian chapters, exercising multi-byte offsets
pub const UKRAINIAN_BOOK: &str = "Розділ 1\nБуло тихо. Вітер ледь рухав листя на деревах біля старої хати.\nНіхто не знав, що буде далі!\n\nРозділ 2\nРанок прийшов несподівано. Сонце піднялося над річкою і засяяло.\n\nГЛАВА 3\nКінець історії був простим.\n";

/// Prose without any heading or boundary-friendly structure
pub const RUNAWAY_TEXT: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
