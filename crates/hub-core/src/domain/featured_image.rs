//! Placeholder cover images for posts published without one.

use super::post::Category;

const IMAGE_PARAMS: &str = "?w=800&h=600&fit=crop&crop=entropy&auto=format";

const GENERIC_POOL: &[&str] = &[
    "photo-1460925895917-afdab827c52f",
    "photo-1555949963-aa79dcee981c",
    "photo-1558655146-d09347e92766",
    "photo-1633356122544-f134324a6cee",
    "photo-1551288049-bebda4e38f71",
    "photo-1563013544-824ae1b704d3",
    "photo-1512941937669-90a1b58e7e9c",
    "photo-1559526324-593bc073d938",
    "photo-1583608205776-bfd35f0d9f83",
    "photo-1544197150-b99a580bb7a8",
    "photo-1518432031352-d6fc5c10da5a",
    "photo-1571171637578-41bc2dd41cd2",
    "photo-1511512578047-dfb367046420",
    "photo-1550745165-9bc0b252726f",
    "photo-1552820728-8b83bb6b773f",
    "photo-1504868584819-f8e8b4b6d7e3",
    "photo-1509228627152-72ae9ae6848d",
    "photo-1558494949-ef010cbdcc31",
    "photo-1451187580459-43490279c0fa",
    "photo-1667372393119-3d4c48d07fc9",
    "photo-1556742049-0cfed4f6a45d",
    "photo-1467232004584-a241de8bcf5d",
    "photo-1586717799252-bd134ad00e26",
    "photo-1577563908411-5077b6dc7624",
    "photo-1611224923853-80b023f02d71",
];

fn category_pool(category: Category) -> &'static [&'static str] {
    match category {
        Category::WebApp => &[
            "photo-1460925895917-afdab827c52f",
            "photo-1555949963-aa79dcee981c",
            "photo-1558655146-d09347e92766",
            "photo-1633356122544-f134324a6cee",
            "photo-1551288049-bebda4e38f71",
        ],
        Category::MobileApp => &[
            "photo-1563013544-824ae1b704d3",
            "photo-1512941937669-90a1b58e7e9c",
            "photo-1559526324-593bc073d938",
            "photo-1583608205776-bfd35f0d9f83",
        ],
        Category::Api => &[
            "photo-1544197150-b99a580bb7a8",
            "photo-1518432031352-d6fc5c10da5a",
            "photo-1571171637578-41bc2dd41cd2",
        ],
        Category::Game => &[
            "photo-1511512578047-dfb367046420",
            "photo-1550745165-9bc0b252726f",
            "photo-1552820728-8b83bb6b773f",
        ],
        Category::DesktopApp => &[
            "photo-1586717799252-bd134ad00e26",
            "photo-1467232004584-a241de8bcf5d",
        ],
        Category::CliTool => &[
            "photo-1629654297299-c8506221ca97",
            "photo-1518432031352-d6fc5c10da5a",
        ],
        Category::Library => &[
            "photo-1544197150-b99a580bb7a8",
            "photo-1571171637578-41bc2dd41cd2",
        ],
        Category::Other => &[
            "photo-1451187580459-43490279c0fa",
            "photo-1558494949-ef010cbdcc31",
        ],
    }
}

/// Image pool for a category, or the generic pool when none is given.
pub fn image_pool(category: Option<Category>) -> &'static [&'static str] {
    match category {
        Some(category) => category_pool(category),
        None => GENERIC_POOL,
    }
}

/// Pick a pseudo-random image URL from the pool matching `category`.
pub fn pick_featured_image(category: Option<Category>) -> String {
    let pool = image_pool(category);
    let photo = pool[rand::random_range(0..pool.len())];
    format!("https://images.unsplash.com/{photo}{IMAGE_PARAMS}")
}
