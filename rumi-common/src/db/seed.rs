//! Sample catalogue
//!
//! Inserted on first start so a fresh install has something to browse.
//! Runs only against an empty store.

use chrono::Local;
use tracing::info;

use crate::db::models::{
    CollectionType, NewCollection, NewDailyVerse, NewDivanPoem, NewMasnaviBook, NewMasnaviPoem,
    NewUser,
};
use crate::store::{verse_date, PoetryStore};
use crate::{Error, Result};

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|t| t.to_string()).collect()
}

/// Populate an empty store with the sample corpus
///
/// Returns `Ok(false)` without touching anything when the store already
/// holds content.
pub async fn seed_sample_data(store: &dyn PoetryStore) -> Result<bool> {
    if !store.is_empty().await? {
        info!("Store already contains data, skipping sample data");
        return Ok(false);
    }

    info!("Seeding {} store with sample data", store.backend_name());

    seed_users(store).await?;
    seed_divan_poems(store).await?;
    seed_books(store).await?;
    seed_masnavi_poems(store).await?;
    seed_collections(store).await?;
    seed_daily_verses(store).await?;

    info!("Sample data seeded");
    Ok(true)
}

async fn seed_users(store: &dyn PoetryStore) -> Result<()> {
    for (username, password) in [("admin", "admin123"), ("user", "user123")] {
        if store.user_by_username(username).await?.is_some() {
            continue;
        }
        store
            .create_user(NewUser {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;
    }
    Ok(())
}

async fn seed_divan_poems(store: &dyn PoetryStore) -> Result<()> {
    let poems = [
        NewDivanPoem {
            ghazal_number: 24,
            title: "Ғазали 24".to_string(),
            content: "Дар зимистон нури хуршед омадӣ,\nФасли гул рӯйи чу хуршед омадӣ.\nМарҳабо, эй ҷони ҷонҳо, марҳабо,\nМарҳабо, эй ҷони ҷонафзо, даро.".to_string(),
            bayt_count: 12,
            tags: tags(&["Ишқ", "Ирфон"]),
            is_favorite: true,
            image_url: Some("https://images.unsplash.com/photo-1630519162138-1f79d13c887e?w=800".to_string()),
            audio_url: Some("/audio/ghazal24.mp3".to_string()),
            explanation: Some("Дар ин ғазал Мавлоно дар васфи ёри хеш сухан мегӯяд ва ӯро ба хуршед ташбеҳ медиҳад.".to_string()),
        },
        NewDivanPoem {
            ghazal_number: 42,
            title: "Ғазали 42".to_string(),
            content: "Эй дӯст, нигоҳи ту чи нури аҷабест,\nДар чашми ту сад рози ниҳон аз тарабест.\nЛабҳои ту гӯё чу шакар аз чи сабаб?\nШояд ки сухан гуфтани ту бе сабабест.".to_string(),
            bayt_count: 8,
            tags: tags(&["Ишқ", "Маърифат"]),
            is_favorite: false,
            image_url: Some("https://images.unsplash.com/photo-1630519186880-28a6669256fe?w=800".to_string()),
            audio_url: Some("/audio/ghazal42.mp3".to_string()),
            explanation: None,
        },
        NewDivanPoem {
            ghazal_number: 76,
            title: "Ғазали 76".to_string(),
            content: "Эй нури ҳақиқат, ки ҷаҳон равшан аз он аст,\nМаъшуқи ҳақиқӣ, ки ҳама ҷон аз он аст.\nАз ишқи ту ҳар зарра ба раққосӣ омад,\nДар шӯру тараб ом ду ҷаҳон аз он аст.".to_string(),
            bayt_count: 10,
            tags: tags(&["Ишқ", "Ҳикмат", "Ирфон"]),
            is_favorite: false,
            image_url: Some("https://images.unsplash.com/photo-1590697349527-81d073040683?w=800".to_string()),
            audio_url: None,
            explanation: None,
        },
    ];

    for poem in poems {
        store.create_divan_poem(poem).await?;
    }
    Ok(())
}

async fn seed_books(store: &dyn PoetryStore) -> Result<()> {
    let books = [
        NewMasnaviBook {
            daftar_number: 1,
            title: "Дафтари аввал".to_string(),
            description: "Дафтари аввали Маснавӣ бо ҳикояти най оғоз мешавад, ки дар он Мавлоно дарди ҷудоӣ аз асли хешро баён мекунад.".to_string(),
            bayt_count: 4003,
            image_url: Some("https://images.unsplash.com/photo-1625895185147-bf4805f597cc?w=800".to_string()),
            theme_color: "blue".to_string(),
        },
        NewMasnaviBook {
            daftar_number: 2,
            title: "Дафтари дуввум".to_string(),
            description: "Дафтари дуввуми Маснавӣ бо ҳикояти подшоҳу канизак оғоз мешавад ва ба мавзӯъҳои ишқу маърифат мепардозад.".to_string(),
            bayt_count: 3810,
            image_url: Some("https://images.unsplash.com/photo-1632406896548-3d619fb80bd9?w=800".to_string()),
            theme_color: "green".to_string(),
        },
        NewMasnaviBook {
            daftar_number: 3,
            title: "Дафтари севвум".to_string(),
            description: "Дафтари севвуми Маснавӣ бо ҳикояти шоҳ ва қассоби ринд оғоз мешавад ва ба масъалаҳои ахлоқӣ ва маънавӣ таваҷҷуҳ мекунад.".to_string(),
            bayt_count: 4810,
            image_url: Some("https://images.unsplash.com/photo-1608318012990-9ab72b585a12?w=800".to_string()),
            theme_color: "amber".to_string(),
        },
    ];

    for book in books {
        store.create_book(book).await?;
    }
    Ok(())
}

async fn book_id(store: &dyn PoetryStore, daftar_number: i64) -> Result<i64> {
    store
        .book_by_daftar(daftar_number)
        .await?
        .map(|b| b.id)
        .ok_or_else(|| Error::Internal(format!("Daftar {} missing after seeding books", daftar_number)))
}

async fn seed_masnavi_poems(store: &dyn PoetryStore) -> Result<()> {
    let first = book_id(store, 1).await?;
    let second = book_id(store, 2).await?;

    let poems = [
        NewMasnaviPoem {
            book_id: first,
            title: "Найнома".to_string(),
            content: "Бишнав аз най чун ҳикоят мекунад,\nАз ҷудоиҳо шикоят мекунад.\nКаз найистон то маро бубридаанд,\nДар нафирам марду зан нолидаанд.".to_string(),
            bayt_count: 18,
            tags: tags(&["Ишқ", "Ҷудоӣ", "Ирфон"]),
            is_favorite: true,
            image_url: Some("https://images.unsplash.com/photo-1568793264149-9ecd7a56aa71?w=800".to_string()),
            audio_url: Some("/audio/naynoma.mp3".to_string()),
            explanation: Some("Дар ин шеър, най рамзи инсони комил аст, ки аз асли хеш ҷудо афтодааст ва барои бозгашт ба он ҳасрат мехӯрад.".to_string()),
        },
        NewMasnaviPoem {
            book_id: first,
            title: "Ҳикояти мардони кӯр ва фил".to_string(),
            content: "Пил андар хонаи торик буд,\nАрзааш овард аз Ҳиндустон.\nАз барои дидани ӯ мардумон,\nАндар он зулмат ҳамешуд ҳар зимон.".to_string(),
            bayt_count: 14,
            tags: tags(&["Ҳикмат", "Маърифат"]),
            is_favorite: true,
            image_url: Some("https://images.unsplash.com/photo-1577452151857-ce63a5e21e6f?w=800".to_string()),
            audio_url: Some("/audio/fil.mp3".to_string()),
            explanation: None,
        },
        NewMasnaviPoem {
            book_id: second,
            title: "Ҳикояти подшоҳ ва канизак".to_string(),
            content: "Буд шоҳе дар замоне пеш аз ин,\nМулки дунё будаш ҳам мулки дин.\nИттифоқан шоҳ рӯзе шуд савор,\nБо хавосаш дар шикор ва корзор.".to_string(),
            bayt_count: 22,
            tags: tags(&["Ишқ", "Табобат", "Ирфон"]),
            is_favorite: false,
            image_url: Some("https://images.unsplash.com/photo-1544129681-3ba1eb710d8a?w=800".to_string()),
            audio_url: None,
            explanation: None,
        },
    ];

    for poem in poems {
        store.create_masnavi_poem(poem).await?;
    }
    Ok(())
}

async fn seed_collections(store: &dyn PoetryStore) -> Result<()> {
    let collections = [
        NewCollection {
            title: "Ишқ ва ирфон".to_string(),
            description: "Маҷмӯи ашъор дар мавзӯи ишқ ва роҳи маънавии ирфон.".to_string(),
            poem_count: 45,
            image_url: "https://images.unsplash.com/photo-1566933293069-a55a2436a5dd?w=800".to_string(),
            collection_type: CollectionType::Divan,
        },
        NewCollection {
            title: "Ҳикматҳо".to_string(),
            description: "Ҳикматҳои ахлоқӣ ва фалсафӣ дар ашъори Мавлоно.".to_string(),
            poem_count: 32,
            image_url: "https://images.unsplash.com/photo-1565794462772-5cf29c8513fd?w=800".to_string(),
            collection_type: CollectionType::Masnavi,
        },
        NewCollection {
            title: "Рубоиёт".to_string(),
            description: "Гулчини беҳтарин рубоиёти Мавлоно аз Девони Шамс.".to_string(),
            poem_count: 60,
            image_url: "https://images.unsplash.com/photo-1589813642001-2c5e8fd0bc0e?w=800".to_string(),
            collection_type: CollectionType::Divan,
        },
    ];

    for collection in collections {
        store.create_collection(collection).await?;
    }
    Ok(())
}

async fn seed_daily_verses(store: &dyn PoetryStore) -> Result<()> {
    let verses = [
        NewDailyVerse {
            text: "Биё, биё, ҳар чи ҳастӣ, биё,\nГар кофирӣ, гар бутпарастӣ, биё.".to_string(),
            source: "Девони Шамс, Ғазали 24".to_string(),
            audio_url: Some("/audio/daily-verse-1.mp3".to_string()),
            date: verse_date(Local::now().date_naive()),
        },
        NewDailyVerse {
            text: "Дар ҷаҳон ҳар кӣ паре дорад, пеши рӯи ту ояд,\nЗи ғамат ҳар кӣ ҳазин аст, ӯ сӯи ту биояд.".to_string(),
            source: "Девони Шамс, Ғазали 50".to_string(),
            audio_url: Some("/audio/daily-verse-2.mp3".to_string()),
            date: "2023-06-01".to_string(),
        },
        NewDailyVerse {
            text: "Нури ҳақро набувад нуру дигар,\nНест андар рухи ӯ ранги дигар.".to_string(),
            source: "Девони Шамс, Ғазали 100".to_string(),
            audio_url: Some("/audio/daily-verse-3.mp3".to_string()),
            date: "2023-06-02".to_string(),
        },
    ];

    for verse in verses {
        store.create_daily_verse(verse).await?;
    }
    Ok(())
}
