//! 电影信息工具：固定 15 部影片的内存目录
//!
//! 查找键为小写片名（去首尾空白）。精确命中返回信息卡；
//! 否则返回包含查询子串的候选（若无，再按查询中的实词匹配片名中的词）；都没有则列出全部片名。

use async_trait::async_trait;

use crate::tools::Tool;

pub struct Movie {
    pub key: &'static str,
    pub title: &'static str,
    pub year: u16,
    pub director: &'static str,
    pub cast: &'static [&'static str],
    pub genre: &'static str,
    pub rating: &'static str,
    pub plot: &'static str,
}

pub const CATALOG: &[Movie] = &[
    Movie {
        key: "the godfather",
        title: "The Godfather",
        year: 1972,
        director: "Francis Ford Coppola",
        cast: &["Marlon Brando", "Al Pacino", "James Caan", "Robert Duvall", "Diane Keaton"],
        genre: "Crime, Drama",
        rating: "9.2/10",
        plot: "The aging patriarch of an organized crime dynasty transfers control to his reluctant son.",
    },
    Movie {
        key: "inception",
        title: "Inception",
        year: 2010,
        director: "Christopher Nolan",
        cast: &["Leonardo DiCaprio", "Marion Cotillard", "Tom Hardy", "Ellen Page", "Ken Watanabe"],
        genre: "Action, Sci-Fi, Thriller",
        rating: "8.8/10",
        plot: "A thief who steals corporate secrets through dream-sharing technology is given the inverse task of planting an idea.",
    },
    Movie {
        key: "pulp fiction",
        title: "Pulp Fiction",
        year: 1994,
        director: "Quentin Tarantino",
        cast: &["John Travolta", "Uma Thurman", "Samuel L. Jackson", "Bruce Willis", "Harvey Keitel"],
        genre: "Crime, Drama",
        rating: "8.9/10",
        plot: "The lives of two mob hitmen, a boxer, a gangster and his wife intertwine in four tales of violence and redemption.",
    },
    Movie {
        key: "the dark knight",
        title: "The Dark Knight",
        year: 2008,
        director: "Christopher Nolan",
        cast: &["Christian Bale", "Heath Ledger", "Aaron Eckhart", "Michael Caine", "Gary Oldman"],
        genre: "Action, Crime, Drama",
        rating: "9.0/10",
        plot: "Batman faces the Joker, a criminal mastermind who wants to plunge Gotham City into anarchy.",
    },
    Movie {
        key: "forrest gump",
        title: "Forrest Gump",
        year: 1994,
        director: "Robert Zemeckis",
        cast: &["Tom Hanks", "Robin Wright", "Gary Sinise", "Mykelti Williamson", "Sally Field"],
        genre: "Drama, Romance",
        rating: "8.8/10",
        plot: "The story of a man with low IQ who accomplishes great things and influences many historical events.",
    },
    Movie {
        key: "the shawshank redemption",
        title: "The Shawshank Redemption",
        year: 1994,
        director: "Frank Darabont",
        cast: &["Tim Robbins", "Morgan Freeman", "Bob Gunton", "William Sadler", "Clancy Brown"],
        genre: "Drama",
        rating: "9.3/10",
        plot: "Two imprisoned men bond over years, finding solace and eventual redemption through acts of common decency.",
    },
    Movie {
        key: "goodfellas",
        title: "Goodfellas",
        year: 1990,
        director: "Martin Scorsese",
        cast: &["Robert De Niro", "Ray Liotta", "Joe Pesci", "Lorraine Bracco", "Paul Sorvino"],
        genre: "Biography, Crime, Drama",
        rating: "8.7/10",
        plot: "The story of Henry Hill and his life in the mob, covering his relationship with his wife Karen Hill and his mob partners.",
    },
    Movie {
        key: "titanic",
        title: "Titanic",
        year: 1997,
        director: "James Cameron",
        cast: &["Leonardo DiCaprio", "Kate Winslet", "Billy Zane", "Gloria Stuart", "Frances Fisher"],
        genre: "Drama, Romance",
        rating: "7.8/10",
        plot: "A seventeen-year-old aristocrat falls in love with a kind but poor artist aboard the luxurious, ill-fated R.M.S. Titanic.",
    },
    Movie {
        key: "casablanca",
        title: "Casablanca",
        year: 1942,
        director: "Michael Curtiz",
        cast: &["Humphrey Bogart", "Ingrid Bergman", "Paul Henreid", "Claude Rains", "Conrad Veidt"],
        genre: "Drama, Romance, War",
        rating: "8.5/10",
        plot: "A cynical expatriate American cafe owner struggles to decide whether to help his former lover and her fugitive husband escape the Nazis in French Morocco.",
    },
    Movie {
        key: "star wars",
        title: "Star Wars: Episode IV - A New Hope",
        year: 1977,
        director: "George Lucas",
        cast: &["Mark Hamill", "Harrison Ford", "Carrie Fisher", "Peter Cushing", "Alec Guinness"],
        genre: "Action, Adventure, Fantasy, Sci-Fi",
        rating: "8.6/10",
        plot: "Luke Skywalker joins forces with a Jedi Knight, a cocky pilot, a Wookiee and two droids to save the galaxy from the Empire's world-destroying battle station.",
    },
    Movie {
        key: "the matrix",
        title: "The Matrix",
        year: 1999,
        director: "The Wachowski Sisters",
        cast: &["Keanu Reeves", "Laurence Fishburne", "Carrie-Anne Moss", "Hugo Weaving", "Gloria Foster"],
        genre: "Action, Sci-Fi",
        rating: "8.7/10",
        plot: "A computer programmer is led to fight an underground war against powerful computers who have constructed his entire reality with a system called the Matrix.",
    },
    Movie {
        key: "schindler's list",
        title: "Schindler's List",
        year: 1993,
        director: "Steven Spielberg",
        cast: &["Liam Neeson", "Ralph Fiennes", "Ben Kingsley", "Caroline Goodall", "Jonathan Sagall"],
        genre: "Biography, Drama, History",
        rating: "9.0/10",
        plot: "In German-occupied Poland during World War II, industrialist Oskar Schindler gradually becomes concerned for his Jewish workforce after witnessing their persecution by the Nazis.",
    },
    Movie {
        key: "citizen kane",
        title: "Citizen Kane",
        year: 1941,
        director: "Orson Welles",
        cast: &["Orson Welles", "Joseph Cotten", "Dorothy Comingore", "Agnes Moorehead", "Ruth Warrick"],
        genre: "Drama, Mystery",
        rating: "8.3/10",
        plot: "Following the death of publishing tycoon Charles Foster Kane, reporters scramble to uncover the meaning of his final utterance: 'Rosebud'.",
    },
    Movie {
        key: "vertigo",
        title: "Vertigo",
        year: 1958,
        director: "Alfred Hitchcock",
        cast: &["James Stewart", "Kim Novak", "Barbara Bel Geddes", "Tom Helmore", "Henry Jones"],
        genre: "Mystery, Romance, Thriller",
        rating: "8.3/10",
        plot: "A former police detective juggles wrestling with his personal demons and becoming obsessed with a beautiful woman.",
    },
    Movie {
        key: "apocalypse now",
        title: "Apocalypse Now",
        year: 1979,
        director: "Francis Ford Coppola",
        cast: &["Martin Sheen", "Marlon Brando", "Robert Duvall", "Dennis Hopper", "Frederic Forrest"],
        genre: "Drama, Mystery, War",
        rating: "8.4/10",
        plot: "A U.S. Army officer serving in Vietnam is tasked with assassinating a renegade Special Forces Colonel who sees himself as a god.",
    },
];

const AVAILABLE_TITLES: &str = "The Godfather, Inception, Pulp Fiction, The Dark Knight, Forrest Gump, \
The Shawshank Redemption, Goodfellas, Titanic, Casablanca, Star Wars, The Matrix, Schindler's List, \
Citizen Kane, Vertigo, and Apocalypse Now";

/// 实词匹配时忽略的词
const STOP_WORDS: &[&str] = &["the", "and", "part", "movie", "film"];

impl Movie {
    /// 信息卡（第二行与倒数第二行各含 16 个空格，保持输出兼容）
    pub fn card(&self) -> String {
        let pad = " ".repeat(16);
        format!(
            "🎬 **{}** ({})\n{pad}\n**Director:** {}\n**Cast:** {}\n**Genre:** {}\n**Rating:** {}\n**Plot:** {}\n{pad}\nThis is sample data. In a real implementation, this would connect to movie databases like TMDB or OMDB API.",
            self.title,
            self.year,
            self.director,
            self.cast.join(", "),
            self.genre,
            self.rating,
            self.plot,
        )
    }
}

/// 精确查找（大小写不敏感、去首尾空白）
pub fn find(title: &str) -> Option<&'static Movie> {
    let key = title.trim().to_lowercase();
    CATALOG.iter().find(|m| m.key == key)
}

/// 候选片名键（目录顺序）
pub fn suggestions(title: &str) -> Vec<&'static str> {
    let key = title.trim().to_lowercase();
    // 空串是任何片名的子串
    let by_substring: Vec<&'static str> = CATALOG
        .iter()
        .filter(|m| m.key.contains(key.as_str()))
        .map(|m| m.key)
        .collect();
    if !by_substring.is_empty() {
        return by_substring;
    }
    let words: Vec<&str> = key
        .split_whitespace()
        .filter(|w| w.chars().count() >= 3 && !STOP_WORDS.contains(w))
        .collect();
    CATALOG
        .iter()
        .filter(|m| m.key.split_whitespace().any(|kw| words.contains(&kw)))
        .map(|m| m.key)
        .collect()
}

pub fn movie_info(title: &str) -> String {
    if let Some(movie) = find(title) {
        return movie.card();
    }
    let hits = suggestions(title);
    if hits.is_empty() {
        format!(
            "Movie '{title}' not found in database. Available movies include: {AVAILABLE_TITLES}."
        )
    } else {
        format!(
            "Movie '{title}' not found in database. Did you mean: {}?",
            hits.join(", ")
        )
    }
}

pub struct MovieInfoTool;

#[async_trait]
impl Tool for MovieInfoTool {
    fn name(&self) -> &str {
        "movie_info"
    }

    fn description(&self) -> &str {
        "Get detailed information about movies including plot, cast, director, rating, and genre. Provide the movie title to search for."
    }

    fn input_name(&self) -> Option<&str> {
        Some("movie_title")
    }

    async fn invoke(&self, input: &str) -> String {
        movie_info(input)
    }
}
